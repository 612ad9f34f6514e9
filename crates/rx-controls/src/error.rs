//! Error types for control system operations.

use thiserror::Error;

/// Result type for control system operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur in control system operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Non-finite value where a number was required.
    #[error("Non-finite value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },
}

impl From<rx_core::RxError> for ControlError {
    fn from(e: rx_core::RxError) -> Self {
        match e {
            rx_core::RxError::NonFinite { what, value } => ControlError::NonFinite { what, value },
            rx_core::RxError::InvalidArg { what } => ControlError::InvalidArg { what },
            rx_core::RxError::LengthMismatch { what, .. } => ControlError::InvalidArg { what },
        }
    }
}
