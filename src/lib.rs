// VirJoy cockpit bridge - shared library
// Aircraft profiles, control mapping, simulator variables and head tracking

pub mod bridge;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod headtrack;
pub mod profile;
pub mod server;

pub use bridge::{BridgeError, VariableBridge};
pub use config::AppConfig;
pub use context::CockpitContext;
pub use engine::{ControlEngine, ControlEvent, ControlRequest};
pub use error::{ControlError, RequestError};
pub use headtrack::HeadTracker;
pub use profile::{Profile, ProfileRegistry};
