//! Virtual cockpit joystick devices
//!
//! The actuation side of the VirJoy bridge: a uinput-backed virtual joystick
//! that simulators see as a regular game controller, plus an in-memory sink
//! used for dry runs and tests. Both implement [`ActuationSink`].

pub mod axis;
pub mod joystick;
pub mod sink;

pub use axis::{AxisId, AXIS_MAX, AXIS_MIN, MAX_BUTTONS};
pub use joystick::{DeviceError, VirtualJoystick};
pub use sink::{ActuationSink, MemorySink, SinkEvent};
