//! rx-plant: thermal model of a stirred-tank reactor with a jacketed
//! heating/cooling circuit.
//!
//! The plant has two states, the reactor contents temperature `T` and the
//! jacket temperature `Tj`. The jacket is fed by a split of a cold and a hot
//! utility stream; the split is set by the valve position `av` (fraction hot).
//!
//! Everything here is a pure function of constants, state and valve position.
//!
//! # Example
//!
//! ```
//! use rx_plant::{PlantConstants, PlantState, derivative, DEFAULT_VALVE_POSITION};
//!
//! let constants = PlantConstants::default();
//! let state = PlantState::default();
//! let rate = derivative(0.0, &state, DEFAULT_VALVE_POSITION, &constants);
//! assert!(rate.reactor_temp.abs() < 1e-3);
//! ```

pub mod constants;
pub mod error;
pub mod model;
pub mod state;

// Re-exports
pub use constants::{DEFAULT_VALVE_POSITION, PlantConstants};
pub use error::{PlantError, PlantResult};
pub use model::{JacketFlows, derivative, jacket_flows, jacket_heat_duty, reactor_residence_time};
pub use state::PlantState;
