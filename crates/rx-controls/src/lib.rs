//! Feedback control for the reactor simulator.
//!
//! Provides a positional PID controller that drives the jacket valve from the
//! reactor temperature error. The controller holds its own memory (integral,
//! last error, last timestamp) and supports:
//!
//! - output clamping and integral clamping (anti-windup)
//! - bumpless reset to a configured bias output
//! - hot-swapping gains without disturbing the stored integral
//! - setpoint changes that reset the controller

pub mod controller;
pub mod error;

pub use controller::{
    DEFAULT_INTEGRAL_LIMITS, DEFAULT_OUTPUT_LIMITS, FALLBACK_DT, PIDController, PIDControllerState,
    PidGains,
};
pub use error::{ControlError, ControlResult};
