//! Error types for plant construction.

use rx_core::error::RxError;
use thiserror::Error;

/// Errors raised while building or checking plant data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlantError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type PlantResult<T> = Result<T, PlantError>;

impl From<RxError> for PlantError {
    fn from(e: RxError) -> Self {
        match e {
            RxError::NonFinite { what, .. } => PlantError::NonPhysical { what },
            RxError::InvalidArg { what } => PlantError::InvalidArg { what },
            RxError::LengthMismatch { what, .. } => PlantError::InvalidArg { what },
        }
    }
}
