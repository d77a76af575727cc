//! Request and control error types

use crate::engine::DeviceSlot;
use thiserror::Error;
use virjoy_device::DeviceError;

/// A request rejected before it reaches the engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("Missing control type")]
    MissingType,

    #[error("Missing field '{0}'")]
    MissingField(&'static str),

    #[error("Field '{0}' is not a valid number")]
    InvalidNumber(&'static str),

    #[error("Field '{field}' out of range: {value}")]
    OutOfRange { field: &'static str, value: i64 },
}

impl RequestError {
    /// Stable error code reported to clients
    pub fn code(&self) -> String {
        match self {
            RequestError::MissingType => "missing_type".to_string(),
            RequestError::MissingField(field) => format!("missing_{field}"),
            RequestError::InvalidNumber(field) | RequestError::OutOfRange { field, .. } => {
                format!("invalid_{field}")
            }
        }
    }
}

/// Errors that abort a control request
///
/// Never retried: commands are idempotent, so the client resends.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("No {0} device")]
    DeviceUnavailable(DeviceSlot),

    #[error("Device error: {0}")]
    Device(#[from] DeviceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_codes() {
        assert_eq!(RequestError::MissingType.code(), "missing_type");
        assert_eq!(RequestError::MissingField("cam_id").code(), "missing_cam_id");
        assert_eq!(RequestError::InvalidNumber("value").code(), "invalid_value");
        assert_eq!(
            RequestError::OutOfRange {
                field: "button",
                value: 999
            }
            .code(),
            "invalid_button"
        );
    }

    #[test]
    fn test_control_error_display() {
        let err = ControlError::DeviceUnavailable(DeviceSlot::CameraHead);
        assert_eq!(err.to_string(), "No camera head device");
    }
}
