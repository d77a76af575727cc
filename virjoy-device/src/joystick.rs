//! Virtual joystick device using evdev/uinput
//!
//! Creates a virtual joystick with absolute axes in the native
//! `0..=32767` range and up to [`MAX_BUTTONS`] buttons, so simulators bind
//! to it like any other game controller.

use crate::axis::{AxisId, AXIS_MAX, AXIS_MIN, MAX_BUTTONS};
use crate::sink::ActuationSink;
use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AbsInfo, AbsoluteAxisType, AttributeSet, EventType, InputEvent, Key, UinputAbsSetup,
};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// First button code; buttons 1..=40 map onto BTN_TRIGGER_HAPPY1..40
const BUTTON_CODE_BASE: u16 = 0x2c0;

/// Errors from virtual joystick operations
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Failed to create virtual device: {0}")]
    CreateDevice(#[source] std::io::Error),
    #[error("Failed to emit event: {0}")]
    EmitEvent(#[source] std::io::Error),
    #[error("Button {0} out of range (1-{max})", max = MAX_BUTTONS)]
    InvalidButton(u8),
    #[error("Axis {0} not enabled on this device")]
    AxisNotEnabled(AxisId),
}

/// Virtual joystick device
pub struct VirtualJoystick {
    name: String,
    device: VirtualDevice,
    /// Current axis values (for change detection)
    axis_values: HashMap<AxisId, i32>,
}

impl VirtualJoystick {
    /// Create a new virtual joystick device
    ///
    /// # Arguments
    /// * `name` - Device name (shown in `evtest` and simulator controller settings)
    /// * `axes` - Which axes to enable on the device
    pub fn new(name: &str, axes: &[AxisId]) -> Result<Self, DeviceError> {
        let mut builder = VirtualDeviceBuilder::new()
            .map_err(DeviceError::CreateDevice)?
            .name(name);

        let mut keys = AttributeSet::<Key>::new();
        for button in 1..=MAX_BUTTONS {
            keys.insert(button_key(button));
        }
        builder = builder
            .with_keys(&keys)
            .map_err(DeviceError::CreateDevice)?;

        // Add requested absolute axes
        for &axis_id in axes {
            let code = axis_id_to_code(axis_id);
            let abs_setup =
                UinputAbsSetup::new(code, AbsInfo::new(AXIS_MIN, AXIS_MIN, AXIS_MAX, 0, 0, 1));
            builder = builder
                .with_absolute_axis(&abs_setup)
                .map_err(DeviceError::CreateDevice)?;
        }

        let device = builder.build().map_err(DeviceError::CreateDevice)?;

        let axis_values = axes.iter().map(|&axis_id| (axis_id, AXIS_MIN)).collect();

        Ok(Self {
            name: name.to_string(),
            device,
            axis_values,
        })
    }

    /// Get current axis value
    pub fn get_axis(&self, axis: AxisId) -> i32 {
        self.axis_values.get(&axis).copied().unwrap_or(AXIS_MIN)
    }
}

impl ActuationSink for VirtualJoystick {
    /// Only emits events if the value has changed.
    fn set_axis(&mut self, axis: AxisId, value: i32) -> Result<(), DeviceError> {
        let clamped = value.clamp(AXIS_MIN, AXIS_MAX);

        match self.axis_values.get(&axis) {
            None => return Err(DeviceError::AxisNotEnabled(axis)),
            Some(&current) if current == clamped => return Ok(()),
            Some(_) => {}
        }

        self.axis_values.insert(axis, clamped);

        let code = axis_id_to_code(axis);
        let event = InputEvent::new_now(EventType::ABSOLUTE, code.0, clamped);

        self.device
            .emit(&[event])
            .map_err(DeviceError::EmitEvent)?;
        debug!("{}: axis {} = {}", self.name, axis, clamped);

        Ok(())
    }

    fn set_button(&mut self, button: u8, pressed: bool) -> Result<(), DeviceError> {
        if button == 0 || button > MAX_BUTTONS {
            return Err(DeviceError::InvalidButton(button));
        }

        let key = button_key(button);
        let event = InputEvent::new_now(EventType::KEY, key.code(), i32::from(pressed));

        self.device
            .emit(&[event])
            .map_err(DeviceError::EmitEvent)?;
        debug!("{}: button {} = {}", self.name, button, pressed);

        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Convert a 1-based button number to its evdev key code
fn button_key(button: u8) -> Key {
    Key::new(BUTTON_CODE_BASE + u16::from(button) - 1)
}

/// Convert our AxisId to evdev AbsoluteAxisType
fn axis_id_to_code(axis: AxisId) -> AbsoluteAxisType {
    match axis {
        AxisId::X => AbsoluteAxisType::ABS_X,
        AxisId::Y => AbsoluteAxisType::ABS_Y,
        AxisId::Z => AbsoluteAxisType::ABS_Z,
        AxisId::RX => AbsoluteAxisType::ABS_RX,
        AxisId::RY => AbsoluteAxisType::ABS_RY,
        AxisId::RZ => AbsoluteAxisType::ABS_RZ,
        AxisId::Slider => AbsoluteAxisType::ABS_THROTTLE,
    }
}
