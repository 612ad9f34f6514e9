//! Simulation clock: simulated time, tick interval, pacing and run state.

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How ticks are scheduled against the wall clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pacing {
    /// One tick per `dt` of wall-clock time.
    RealTime,
    /// Ticks back-to-back, as fast as the integrator allows.
    #[default]
    Batch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Stopped,
}

/// Simulated time is `ticks * dt`, so it never drifts from repeated addition.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationClock {
    dt: f64,
    ticks: u64,
    pacing: Pacing,
    run_state: RunState,
}

impl SimulationClock {
    /// Create a running clock at `t = 0`.
    pub fn new(dt: f64, pacing: Pacing) -> SimResult<Self> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "dt must be positive",
            });
        }
        Ok(Self {
            dt,
            ticks: 0,
            pacing,
            run_state: RunState::Running,
        })
    }

    /// Current simulated time, seconds.
    pub fn time(&self) -> f64 {
        self.ticks as f64 * self.dt
    }

    /// Simulated time after the next tick.
    pub fn next_time(&self) -> f64 {
        (self.ticks + 1) as f64 * self.dt
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    /// Record one accepted tick.
    pub(crate) fn advance(&mut self) {
        self.ticks += 1;
    }

    /// Transition to `Stopped`. Returns `false` if already stopped.
    pub fn stop(&mut self) -> bool {
        let was_running = self.is_running();
        self.run_state = RunState::Stopped;
        was_running
    }

    /// Wall-clock offset, from the start of a paced run, at which the tick
    /// with index `run_ticks` (counted within that run) becomes due.
    /// Saturates at [`Duration::MAX`].
    pub fn boundary(&self, run_ticks: u64) -> Duration {
        Duration::try_from_secs_f64((run_ticks + 1) as f64 * self.dt).unwrap_or(Duration::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_dt() {
        assert!(SimulationClock::new(0.0, Pacing::Batch).is_err());
        assert!(SimulationClock::new(-1.0, Pacing::Batch).is_err());
        assert!(SimulationClock::new(f64::NAN, Pacing::RealTime).is_err());
    }

    #[test]
    fn time_is_tick_count_times_dt() {
        let mut clock = SimulationClock::new(0.1, Pacing::Batch).unwrap();
        for _ in 0..1000 {
            clock.advance();
        }
        assert_eq!(clock.ticks(), 1000);
        assert_eq!(clock.time(), 1000.0 * 0.1);
        assert_eq!(clock.next_time(), 1001.0 * 0.1);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut clock = SimulationClock::new(1.0, Pacing::Batch).unwrap();
        assert!(clock.is_running());
        assert!(clock.stop());
        assert!(!clock.stop());
        assert_eq!(clock.run_state(), RunState::Stopped);
    }

    #[test]
    fn boundaries_are_multiples_of_dt() {
        let clock = SimulationClock::new(0.5, Pacing::RealTime).unwrap();
        assert_eq!(clock.boundary(0), Duration::from_millis(500));
        assert_eq!(clock.boundary(3), Duration::from_secs(2));
    }

    #[test]
    fn huge_dt_boundary_saturates() {
        let clock = SimulationClock::new(1e20, Pacing::RealTime).unwrap();
        assert_eq!(clock.boundary(0), Duration::MAX);
        assert_eq!(clock.boundary(u64::MAX), Duration::MAX);
    }

    #[test]
    fn pacing_serde_names() {
        assert_eq!(Pacing::default(), Pacing::Batch);
        assert_eq!(serde_json::to_string(&Pacing::RealTime).unwrap(), "\"realtime\"");
        assert_eq!(serde_json::to_string(&Pacing::Batch).unwrap(), "\"batch\"");
        let parsed: Pacing = serde_json::from_str("\"realtime\"").unwrap();
        assert_eq!(parsed, Pacing::RealTime);
    }
}
