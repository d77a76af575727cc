// Aircraft profile module
// Per-aircraft static configuration and formula functions

pub mod builtin;
pub mod family;
pub mod json;
pub mod registry;
pub mod types;

pub use builtin::DEFAULT_PROFILE_ID;
pub use family::AircraftFamily;
pub use json::{JsonProfile, LoadError};
pub use registry::ProfileRegistry;
pub use types::{
    AxisMap, ButtonMap, CameraSlot, FlapDetent, Profile, ReverseBehavior, ThrottleDetent,
};
