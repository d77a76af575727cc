//! Actuation commands and resolved action plans

use super::release::ReleaseTarget;
use std::fmt;
use std::time::Duration;
use virjoy_device::{AxisId, AXIS_MAX, AXIS_MIN};

/// Hold time for discrete cockpit switches
pub const PULSE_HOLD: Duration = Duration::from_millis(100);
/// Hold time for camera selection and raw button presses
pub const SHORT_PULSE_HOLD: Duration = Duration::from_millis(50);

/// Which virtual device a command targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceSlot {
    /// Flight controls, levers and panel buttons
    Cockpit,
    /// Pan/tilt camera head
    CameraHead,
}

impl fmt::Display for DeviceSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceSlot::Cockpit => f.write_str("cockpit"),
            DeviceSlot::CameraHead => f.write_str("camera head"),
        }
    }
}

/// A fully resolved device operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuationCommand {
    /// Set an axis to a native value
    Axis {
        device: DeviceSlot,
        axis: AxisId,
        value: i32,
    },
    /// Latch a button up or down
    Button {
        device: DeviceSlot,
        button: u8,
        pressed: bool,
    },
    /// Press, hold, release
    Pulse {
        device: DeviceSlot,
        button: u8,
        hold: Duration,
    },
}

impl ActuationCommand {
    pub fn axis(device: DeviceSlot, axis: AxisId, value: i32) -> Self {
        ActuationCommand::Axis {
            device,
            axis,
            value,
        }
    }

    pub fn button(device: DeviceSlot, button: u8, pressed: bool) -> Self {
        ActuationCommand::Button {
            device,
            button,
            pressed,
        }
    }

    pub fn pulse(device: DeviceSlot, button: u8, hold: Duration) -> Self {
        ActuationCommand::Pulse {
            device,
            button,
            hold,
        }
    }

    pub fn device(&self) -> DeviceSlot {
        match self {
            ActuationCommand::Axis { device, .. }
            | ActuationCommand::Button { device, .. }
            | ActuationCommand::Pulse { device, .. } => *device,
        }
    }
}

impl fmt::Display for ActuationCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActuationCommand::Axis {
                device,
                axis,
                value,
            } => write!(f, "{device}: axis {axis} = {value}"),
            ActuationCommand::Button {
                device,
                button,
                pressed,
            } => write!(
                f,
                "{device}: button {button} {}",
                if *pressed { "down" } else { "up" }
            ),
            ActuationCommand::Pulse {
                device,
                button,
                hold,
            } => write!(f, "{device}: pulse button {button} ({}ms)", hold.as_millis()),
        }
    }
}

/// Scale a normalized value (0..1) to the native axis range
pub fn scale(value: f64) -> i32 {
    to_native(value * f64::from(AXIS_MAX))
}

/// Round a value already in device units and clamp it to the axis range
pub fn to_native(value: f64) -> i32 {
    if value.is_nan() {
        return AXIS_MIN;
    }
    value.round().clamp(f64::from(AXIS_MIN), f64::from(AXIS_MAX)) as i32
}

/// Result reported to the client for an accepted request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Request understood but deliberately not acted on
    Ignored,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Ignored => "ignored",
        }
    }
}

/// One step of a resolved plan, executed in order
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Actuate(ActuationCommand),
    /// Update the shared wheel-brake value
    RecordWheelBrake(f64),
    /// Start the detached parking-brake release sequence
    ReleaseParkingBrake(ReleaseTarget),
}

/// What the engine will do for one event
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub actions: Vec<Action>,
    pub outcome: Outcome,
}

impl Resolution {
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            outcome: Outcome::Success,
        }
    }

    /// A resolution with no actions
    pub fn ignored() -> Self {
        Self {
            actions: Vec::new(),
            outcome: Outcome::Ignored,
        }
    }

    pub fn then(mut self, command: ActuationCommand) -> Self {
        self.actions.push(Action::Actuate(command));
        self
    }

    pub fn then_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Device commands in plan order
    pub fn commands(&self) -> impl Iterator<Item = &ActuationCommand> {
        self.actions.iter().filter_map(|a| match a {
            Action::Actuate(cmd) => Some(cmd),
            _ => None,
        })
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::new()
    }
}
