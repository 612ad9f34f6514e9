//! Transient simulation of the jacketed reactor.
//!
//! Provides:
//! - `TransientModel` trait and the reactor's implementation of it
//! - Adaptive Dormand–Prince 4(5) integrator and a fixed-step RK4
//! - Simulation clock with real-time or batch pacing
//! - `ReactorSimulation`: one tick = controller, integrate, snapshot
//! - Runner that paces ticks and services the consumer between them

pub mod clock;
pub mod error;
pub mod integrator;
pub mod model;
pub mod reactor;
pub mod runner;
pub mod sim;

// Re-exports for public API
pub use clock::{Pacing, RunState, SimulationClock};
pub use error::{SimError, SimResult};
pub use integrator::{DormandPrince45, Integrator, RK4};
pub use model::TransientModel;
pub use reactor::ReactorModel;
pub use runner::{RunSummary, SnapshotSink, run};
pub use sim::{
    ControlMode, IntegratorType, ParameterUpdate, ReactorSimulation, SimSetup, Snapshot,
    SolverOptions,
};
