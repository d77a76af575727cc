//! Actuation sink abstraction
//!
//! Everything that consumes axis/button writes implements [`ActuationSink`]:
//! the uinput [`VirtualJoystick`](crate::VirtualJoystick) in production and
//! [`MemorySink`] for dry runs and tests.

use crate::axis::{AxisId, AXIS_MAX, AXIS_MIN, MAX_BUTTONS};
use crate::joystick::DeviceError;
use std::collections::HashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

/// A device that accepts axis and button writes
pub trait ActuationSink: Send {
    /// Set an axis to a native value (clamped to `AXIS_MIN..=AXIS_MAX`)
    fn set_axis(&mut self, axis: AxisId, value: i32) -> Result<(), DeviceError>;

    /// Press or release a button (numbered from 1)
    fn set_button(&mut self, button: u8, pressed: bool) -> Result<(), DeviceError>;

    /// Human-readable device name (for logs)
    fn name(&self) -> &str;
}

/// A write observed by a [`MemorySink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    Axis { axis: AxisId, value: i32 },
    Button { button: u8, pressed: bool },
}

#[derive(Default)]
struct MemoryState {
    events: Vec<SinkEvent>,
    axis_values: HashMap<AxisId, i32>,
}

/// In-memory sink
///
/// Records every effective write in order. Clones share the same log, so a
/// test can keep one handle while the engine owns another.
#[derive(Clone)]
pub struct MemorySink {
    name: String,
    state: Arc<Mutex<MemoryState>>,
    /// Log each write at info level (dry-run mode)
    verbose: bool,
}

impl MemorySink {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: Arc::new(Mutex::new(MemoryState::default())),
            verbose: false,
        }
    }

    /// Sink that logs every write instead of touching hardware
    pub fn dry_run(name: &str) -> Self {
        Self {
            verbose: true,
            ..Self::new(name)
        }
    }

    /// Snapshot of all recorded writes
    pub fn events(&self) -> Vec<SinkEvent> {
        self.state.lock().events.clone()
    }

    /// Forget recorded writes (axis values are kept)
    pub fn clear(&self) {
        self.state.lock().events.clear();
    }

    /// Last value written to an axis
    pub fn get_axis(&self, axis: AxisId) -> i32 {
        self.state.lock().axis_values.get(&axis).copied().unwrap_or(AXIS_MIN)
    }
}

impl ActuationSink for MemorySink {
    fn set_axis(&mut self, axis: AxisId, value: i32) -> Result<(), DeviceError> {
        let clamped = value.clamp(AXIS_MIN, AXIS_MAX);
        let mut state = self.state.lock();

        // Only record if changed
        if state.axis_values.get(&axis) == Some(&clamped) {
            return Ok(());
        }
        state.axis_values.insert(axis, clamped);
        state.events.push(SinkEvent::Axis {
            axis,
            value: clamped,
        });
        drop(state);

        if self.verbose {
            info!("[{}] axis {} = {}", self.name, axis, clamped);
        }
        Ok(())
    }

    fn set_button(&mut self, button: u8, pressed: bool) -> Result<(), DeviceError> {
        if button == 0 || button > MAX_BUTTONS {
            return Err(DeviceError::InvalidButton(button));
        }
        self.state.lock()
            .events
            .push(SinkEvent::Button { button, pressed });

        if self.verbose {
            info!(
                "[{}] button {} {}",
                self.name,
                button,
                if pressed { "down" } else { "up" }
            );
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
