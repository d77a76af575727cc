// Device state shared by control requests and release sequences

use super::command::{ActuationCommand, DeviceSlot};
use crate::error::ControlError;
use tracing::trace;
use virjoy_device::ActuationSink;

/// The actuation sinks plus the last applied wheel-brake value
///
/// Always accessed through the engine's device lock.
pub struct Devices {
    cockpit: Option<Box<dyn ActuationSink>>,
    camera: Option<Box<dyn ActuationSink>>,
    /// Last brake lever value (normalized), restored after a parking-brake release
    pub wheel_brake: f64,
}

impl Devices {
    pub fn new(
        cockpit: Option<Box<dyn ActuationSink>>,
        camera: Option<Box<dyn ActuationSink>>,
    ) -> Self {
        Self {
            cockpit,
            camera,
            wheel_brake: 0.0,
        }
    }

    pub fn has(&self, slot: DeviceSlot) -> bool {
        match slot {
            DeviceSlot::Cockpit => self.cockpit.is_some(),
            DeviceSlot::CameraHead => self.camera.is_some(),
        }
    }

    /// Fail unless the device in `slot` is present
    pub fn require(&self, slot: DeviceSlot) -> Result<(), ControlError> {
        if self.has(slot) {
            Ok(())
        } else {
            Err(ControlError::DeviceUnavailable(slot))
        }
    }

    fn sink(
        &mut self,
        slot: DeviceSlot,
    ) -> Result<&mut (dyn ActuationSink + 'static), ControlError> {
        let sink = match slot {
            DeviceSlot::Cockpit => self.cockpit.as_deref_mut(),
            DeviceSlot::CameraHead => self.camera.as_deref_mut(),
        };
        sink.ok_or(ControlError::DeviceUnavailable(slot))
    }

    /// Execute one command; pulses sleep for their hold time
    pub async fn execute(&mut self, command: &ActuationCommand) -> Result<(), ControlError> {
        trace!("{}", command);
        match *command {
            ActuationCommand::Axis {
                device,
                axis,
                value,
            } => self.sink(device)?.set_axis(axis, value)?,
            ActuationCommand::Button {
                device,
                button,
                pressed,
            } => self.sink(device)?.set_button(button, pressed)?,
            ActuationCommand::Pulse {
                device,
                button,
                hold,
            } => {
                self.sink(device)?.set_button(button, true)?;
                tokio::time::sleep(hold).await;
                self.sink(device)?.set_button(button, false)?;
            }
        }
        Ok(())
    }
}
