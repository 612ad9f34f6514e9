//! rx-core: shared foundation for the reactor simulator.
//!
//! Contains:
//! - units (uom SI types + constructors for the plant's quantities)
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

pub use error::{RxError, RxResult};
pub use numeric::*;
pub use units::*;
