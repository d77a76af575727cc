//! Control requests and validated control events
//!
//! Clients send loosely-typed JSON (numbers sometimes arrive as strings).
//! [`ControlEvent::from_request`] validates a [`ControlRequest`] into a typed
//! event so the engine never sees malformed input.

use crate::error::RequestError;
use serde::Deserialize;
use serde_json::Value;

/// Raw control request as posted by the touchscreen client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ControlRequest {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub reverse: Option<Value>,
    #[serde(default)]
    pub cam_id: Option<Value>,
    #[serde(default)]
    pub val_x: Option<Value>,
    #[serde(default)]
    pub val_y: Option<Value>,
    #[serde(default)]
    pub state: Option<Value>,
    #[serde(default)]
    pub button: Option<Value>,
    #[serde(default)]
    pub active: Option<Value>,
    /// Aircraft profile id (default profile when absent)
    #[serde(default)]
    pub profile: Option<String>,
}

/// Control event kinds, used for handler dispatch and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Throttle,
    Rudder,
    Brakes,
    Spoilers,
    ArmSpoilers,
    FlapsAxis,
    FlapCommand,
    ParkingBrake,
    Camera,
    FlightControls,
    GearCommand,
    IdleCommand,
    CamControl,
    RawButton,
    Unknown,
}

/// A validated control event
///
/// Values are normalized to 0..1 by the client; they are not clamped here
/// because some formulas intentionally exceed full scale.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    Throttle { value: f64, reverse: bool },
    Rudder { value: f64 },
    Brakes { value: f64 },
    Spoilers { value: f64 },
    ArmSpoilers,
    FlapsAxis { value: f64 },
    /// Discrete flap step: `value == 0` retracts one notch, anything else extends
    FlapCommand { value: f64 },
    ParkingBrake { engaged: bool },
    Camera { cam_id: u8 },
    FlightControls { x: f64, y: f64 },
    /// Gear lever moved; `up` when the client reports state "UP"
    GearCommand { up: bool },
    IdleCommand,
    CamControl { active: bool, x: f64, y: f64 },
    /// Raw button pulse; `None` for a non-positive index (no-op)
    RawButton { button: Option<u8> },
    Unknown(String),
}

impl ControlEvent {
    /// Validate a raw request
    pub fn from_request(req: &ControlRequest) -> Result<Self, RequestError> {
        let kind = req
            .kind
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(RequestError::MissingType)?;

        let event = match kind {
            "throttle" => ControlEvent::Throttle {
                value: number("value", &req.value, 0.0)?,
                reverse: flag("reverse", &req.reverse)?,
            },
            "rudder" => ControlEvent::Rudder {
                value: number("value", &req.value, 0.0)?,
            },
            "brakes" => ControlEvent::Brakes {
                value: number("value", &req.value, 0.0)?,
            },
            "spoilers" => ControlEvent::Spoilers {
                value: number("value", &req.value, 0.0)?,
            },
            "arm_spoilers" => ControlEvent::ArmSpoilers,
            "flaps_axis" => ControlEvent::FlapsAxis {
                value: number("value", &req.value, 0.0)?,
            },
            "flap_command" => ControlEvent::FlapCommand {
                value: number("value", &req.value, 0.0)?,
            },
            "parking_brake" => ControlEvent::ParkingBrake {
                engaged: integer("state", &req.state)?.unwrap_or(0) != 0,
            },
            "camera" => {
                let cam_id = integer("cam_id", &req.cam_id)?
                    .ok_or(RequestError::MissingField("cam_id"))?;
                ControlEvent::Camera {
                    cam_id: u8::try_from(cam_id).map_err(|_| RequestError::OutOfRange {
                        field: "cam_id",
                        value: cam_id,
                    })?,
                }
            }
            "flight_controls" => ControlEvent::FlightControls {
                x: number("val_x", &req.val_x, 0.5)?,
                y: number("val_y", &req.val_y, 0.5)?,
            },
            "gear_command" => ControlEvent::GearCommand {
                up: req
                    .state
                    .as_ref()
                    .and_then(Value::as_str)
                    .is_some_and(|s| s.trim().eq_ignore_ascii_case("up")),
            },
            "idle_command" => ControlEvent::IdleCommand,
            "cam_control" => ControlEvent::CamControl {
                active: flag("active", &req.active)?,
                x: number("val_x", &req.val_x, 0.5)?,
                y: number("val_y", &req.val_y, 0.5)?,
            },
            "vjoy_button" | "raw_button" => {
                let button = integer("button", &req.button)?.unwrap_or(0);
                if button > i64::from(u8::MAX) {
                    return Err(RequestError::OutOfRange {
                        field: "button",
                        value: button,
                    });
                }
                ControlEvent::RawButton {
                    button: u8::try_from(button).ok().filter(|&b| b > 0),
                }
            }
            other => ControlEvent::Unknown(other.to_string()),
        };

        Ok(event)
    }

    pub fn kind(&self) -> ControlKind {
        match self {
            ControlEvent::Throttle { .. } => ControlKind::Throttle,
            ControlEvent::Rudder { .. } => ControlKind::Rudder,
            ControlEvent::Brakes { .. } => ControlKind::Brakes,
            ControlEvent::Spoilers { .. } => ControlKind::Spoilers,
            ControlEvent::ArmSpoilers => ControlKind::ArmSpoilers,
            ControlEvent::FlapsAxis { .. } => ControlKind::FlapsAxis,
            ControlEvent::FlapCommand { .. } => ControlKind::FlapCommand,
            ControlEvent::ParkingBrake { .. } => ControlKind::ParkingBrake,
            ControlEvent::Camera { .. } => ControlKind::Camera,
            ControlEvent::FlightControls { .. } => ControlKind::FlightControls,
            ControlEvent::GearCommand { .. } => ControlKind::GearCommand,
            ControlEvent::IdleCommand => ControlKind::IdleCommand,
            ControlEvent::CamControl { .. } => ControlKind::CamControl,
            ControlEvent::RawButton { .. } => ControlKind::RawButton,
            ControlEvent::Unknown(_) => ControlKind::Unknown,
        }
    }
}

/// Read a finite number; absent or null fields take `default`
pub(crate) fn number(
    field: &'static str,
    raw: &Option<Value>,
    default: f64,
) -> Result<f64, RequestError> {
    let parsed = match raw {
        None | Some(Value::Null) => return Ok(default),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or(RequestError::InvalidNumber(field))
}

/// Read an integer (whole numbers written as floats are accepted)
fn integer(field: &'static str, raw: &Option<Value>) -> Result<Option<i64>, RequestError> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .map(Some)
            .ok_or(RequestError::InvalidNumber(field)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| RequestError::InvalidNumber(field)),
        Some(_) => Err(RequestError::InvalidNumber(field)),
    }
}

/// Read a truthy flag: booleans, non-zero numbers, "true"/"1"
fn flag(field: &'static str, raw: &Option<Value>) -> Result<bool, RequestError> {
    match raw {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::Number(n)) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" | "" => Ok(false),
            _ => Err(RequestError::InvalidNumber(field)),
        },
        Some(_) => Err(RequestError::InvalidNumber(field)),
    }
}
