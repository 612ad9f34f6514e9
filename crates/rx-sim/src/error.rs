//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered during transient simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Rejected operator edit; the previous value stays in effect.
    #[error("Invalid parameter: {what}")]
    InvalidParameter { what: String },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: &'static str },

    /// The integrator could not complete the span. Fatal for the tick.
    #[error("Integration failed at t={t}: {what}")]
    Integration { t: f64, what: String },

    #[error("Simulation is stopped")]
    Stopped,
}

pub type SimResult<T> = Result<T, SimError>;

impl From<rx_controls::ControlError> for SimError {
    fn from(e: rx_controls::ControlError) -> Self {
        SimError::InvalidParameter {
            what: e.to_string(),
        }
    }
}

impl From<rx_plant::PlantError> for SimError {
    fn from(e: rx_plant::PlantError) -> Self {
        SimError::InvalidParameter {
            what: e.to_string(),
        }
    }
}

impl From<rx_core::RxError> for SimError {
    fn from(e: rx_core::RxError) -> Self {
        match e {
            rx_core::RxError::NonFinite { what, .. } => SimError::NonPhysical { what },
            rx_core::RxError::InvalidArg { what } => SimError::InvalidArg { what },
            rx_core::RxError::LengthMismatch { what, .. } => SimError::InvalidArg { what },
        }
    }
}
