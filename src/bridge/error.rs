// Variable bridge errors

use thiserror::Error;

/// Failure talking to the variable service itself
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Service rejected request: {0}")]
    Rejected(String),

    #[error("Non-numeric value: {0:?}")]
    NotNumeric(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Errors reported by [`VariableBridge`](super::VariableBridge) operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BridgeError {
    #[error("No variable service configured")]
    NotInstalled,

    #[error("No readable variables configured")]
    NoVarsConfigured,

    /// The first connection attempt failed; not retried
    #[error("Variable service init failed: {0}")]
    InitFailed(String),

    #[error("Variable service timed out")]
    Timeout,

    #[error("Variable service disconnected: {0}")]
    Disconnected(String),

    #[error("Variable service error: {0}")]
    Rejected(String),

    #[error("Unknown variable key '{0}'")]
    UnknownKey(String),

    #[error("Variable '{0}' is not readable")]
    NotReadable(String),

    #[error("Invalid delta")]
    InvalidDelta,
}

impl BridgeError {
    /// Stable error code reported to clients
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::NotInstalled => "mobiflight_module_not_installed",
            BridgeError::NoVarsConfigured => "no_vars_configured",
            BridgeError::InitFailed(_) => "mobiflight_init_failed",
            BridgeError::Timeout => "mobiflight_timeout",
            BridgeError::Disconnected(_) => "mobiflight_disconnected",
            BridgeError::Rejected(_) => "mobiflight_error",
            BridgeError::UnknownKey(_) => "unknown_key",
            BridgeError::NotReadable(_) => "not_readable",
            BridgeError::InvalidDelta => "invalid_delta",
        }
    }

    /// The service cannot be reached right now (or ever)
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            BridgeError::NotInstalled
                | BridgeError::NoVarsConfigured
                | BridgeError::InitFailed(_)
                | BridgeError::Timeout
                | BridgeError::Disconnected(_)
        )
    }
}
