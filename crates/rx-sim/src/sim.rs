//! The reactor simulation: plant state, controller, clock and integrator.
//!
//! One [`ReactorSimulation::tick`] picks the valve position (controller output
//! in closed loop, operator override in open loop), integrates the plant over
//! one `dt` with that position frozen, advances the clock and returns the
//! resulting [`Snapshot`]. Pacing and servicing consumers between ticks belong
//! to [`crate::runner::run`].

use crate::clock::{Pacing, SimulationClock};
use crate::error::{SimError, SimResult};
use crate::integrator::{DormandPrince45, Integrator, RK4};
use crate::reactor::ReactorModel;
use rx_controls::{PIDController, PidGains};
use rx_plant::{DEFAULT_VALVE_POSITION, PlantConstants, PlantState};
use serde::{Deserialize, Serialize};

/// Where the valve position comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// Operator override.
    OpenLoop,
    /// PID controller on reactor temperature.
    #[default]
    ClosedLoop,
}

/// Integrator selection for simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegratorType {
    /// Adaptive Dormand–Prince 4(5).
    #[default]
    #[serde(rename = "dormand_prince45")]
    DormandPrince45,
    /// One classical RK4 step per tick.
    #[serde(rename = "rk4")]
    RK4,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolverOptions {
    pub integrator: IntegratorType,
    pub rtol: f64,
    pub atol: f64,
    /// Safety limit on accepted substeps per tick (adaptive only).
    pub max_substeps: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        let dp = DormandPrince45::default();
        Self {
            integrator: IntegratorType::default(),
            rtol: dp.tol.rel,
            atol: dp.tol.abs,
            max_substeps: dp.max_substeps,
        }
    }
}

#[derive(Clone, Debug)]
enum Solver {
    DormandPrince(DormandPrince45),
    Rk4(RK4),
}

impl Solver {
    fn from_options(opts: &SolverOptions) -> SimResult<Self> {
        Ok(match opts.integrator {
            IntegratorType::DormandPrince45 => Solver::DormandPrince(
                DormandPrince45::new(opts.rtol, opts.atol)?.with_max_substeps(opts.max_substeps),
            ),
            IntegratorType::RK4 => Solver::Rk4(RK4),
        })
    }

    fn step(
        &self,
        model: &mut ReactorModel<'_>,
        t: f64,
        x: &PlantState,
        dt: f64,
    ) -> SimResult<PlantState> {
        match self {
            Solver::DormandPrince(s) => s.step(model, t, x, dt),
            Solver::Rk4(s) => s.step(model, t, x, dt),
        }
    }
}

/// One emitted sample, taken at the end of a tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Simulated time, seconds.
    pub sim_time: f64,
    /// Reactor temperature, °C.
    pub reactor_temp: f64,
    /// Jacket temperature, °C.
    pub jacket_temp: f64,
    /// Valve position used over the tick.
    pub valve_position: f64,
    /// Controller setpoint in effect for the tick, °C.
    pub setpoint: f64,
}

/// Operator edit applied between ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParameterUpdate {
    /// New setpoint; resets the controller if it differs.
    Setpoint(f64),
    Gains(PidGains),
    Kp(f64),
    Ki(f64),
    Kd(f64),
    /// Open-loop valve override in `[0, 1]`.
    Valve(f64),
    Mode(ControlMode),
}

/// Everything needed to start a simulation.
#[derive(Clone, Debug)]
pub struct SimSetup {
    pub constants: PlantConstants,
    pub initial: PlantState,
    pub controller: PIDController,
    pub mode: ControlMode,
    /// Open-loop valve override.
    pub valve: f64,
    /// Tick interval, seconds.
    pub dt: f64,
    pub pacing: Pacing,
    pub solver: SolverOptions,
}

impl Default for SimSetup {
    fn default() -> Self {
        Self {
            constants: PlantConstants::default(),
            initial: PlantState::default(),
            controller: PIDController::default(),
            mode: ControlMode::default(),
            valve: DEFAULT_VALVE_POSITION,
            dt: 1.0,
            pacing: Pacing::default(),
            solver: SolverOptions::default(),
        }
    }
}

fn check_valve(valve: f64) -> SimResult<f64> {
    if !valve.is_finite() || !(0.0..=1.0).contains(&valve) {
        return Err(SimError::InvalidParameter {
            what: format!("valve position {valve} outside [0, 1]"),
        });
    }
    Ok(valve)
}

/// A running reactor simulation.
#[derive(Clone, Debug)]
pub struct ReactorSimulation {
    constants: PlantConstants,
    state: PlantState,
    controller: PIDController,
    mode: ControlMode,
    valve: f64,
    clock: SimulationClock,
    solver: Solver,
}

impl ReactorSimulation {
    pub fn new(setup: SimSetup) -> SimResult<Self> {
        setup.constants.validate()?;
        if !setup.initial.is_finite() {
            return Err(SimError::InvalidParameter {
                what: "initial temperatures must be finite".to_string(),
            });
        }
        let clock = SimulationClock::new(setup.dt, setup.pacing)?;
        let solver = Solver::from_options(&setup.solver)?;
        let valve = match setup.mode {
            ControlMode::OpenLoop => check_valve(setup.valve)?,
            ControlMode::ClosedLoop => setup.controller.last_output(),
        };

        Ok(Self {
            constants: setup.constants,
            state: setup.initial,
            controller: setup.controller,
            mode: setup.mode,
            valve,
            clock,
            solver,
        })
    }

    /// Advance by one tick and return the snapshot at the new time.
    ///
    /// An integration failure stops the clock and leaves the state at the
    /// last accepted tick.
    pub fn tick(&mut self) -> SimResult<Snapshot> {
        if !self.clock.is_running() {
            return Err(SimError::Stopped);
        }

        let t0 = self.clock.time();
        let dt = self.clock.dt();
        if self.mode == ControlMode::ClosedLoop {
            self.valve = self.controller.compute(self.state.reactor_temp, t0);
        }

        let mut model = ReactorModel::new(&self.constants, self.valve);
        let next = match self.solver.step(&mut model, t0, &self.state, dt) {
            Ok(next) => next,
            Err(e) => {
                tracing::error!(t = t0, valve = self.valve, error = %e, "integration failed, stopping");
                self.clock.stop();
                return Err(e);
            }
        };

        self.state = next;
        self.clock.advance();
        let snapshot = self.snapshot();
        tracing::debug!(
            t = snapshot.sim_time,
            reactor_temp = snapshot.reactor_temp,
            jacket_temp = snapshot.jacket_temp,
            valve = snapshot.valve_position,
            "tick"
        );
        Ok(snapshot)
    }

    /// Apply an operator edit. Invalid edits are logged, returned as
    /// [`SimError::InvalidParameter`] and leave the simulation unchanged.
    pub fn apply(&mut self, update: ParameterUpdate) -> SimResult<()> {
        let result = self.apply_inner(update);
        match &result {
            Ok(()) => tracing::info!(t = self.time(), ?update, "parameter updated"),
            Err(e) => tracing::warn!(t = self.time(), ?update, error = %e, "rejected parameter update"),
        }
        result
    }

    fn apply_inner(&mut self, update: ParameterUpdate) -> SimResult<()> {
        match update {
            ParameterUpdate::Setpoint(sp) => {
                self.controller.set_setpoint(sp)?;
            }
            ParameterUpdate::Gains(gains) => self.controller.set_gains(gains)?,
            ParameterUpdate::Kp(kp) => self.controller.set_gains(PidGains {
                kp,
                ..self.controller.gains()
            })?,
            ParameterUpdate::Ki(ki) => self.controller.set_gains(PidGains {
                ki,
                ..self.controller.gains()
            })?,
            ParameterUpdate::Kd(kd) => self.controller.set_gains(PidGains {
                kd,
                ..self.controller.gains()
            })?,
            ParameterUpdate::Valve(valve) => {
                if self.mode == ControlMode::ClosedLoop {
                    return Err(SimError::InvalidParameter {
                        what: "valve override requires open-loop mode".to_string(),
                    });
                }
                self.valve = check_valve(valve)?;
            }
            ParameterUpdate::Mode(mode) => self.set_mode(mode)?,
        }
        Ok(())
    }

    /// Switch between open and closed loop.
    ///
    /// Closed to open holds the last controller output as the override. Open
    /// to closed re-seeds the controller on the current override so the first
    /// output at zero error continues from it.
    pub fn set_mode(&mut self, mode: ControlMode) -> SimResult<()> {
        if mode == self.mode {
            return Ok(());
        }
        match mode {
            ControlMode::OpenLoop => {
                self.valve = self.controller.last_output();
            }
            ControlMode::ClosedLoop => {
                let (lo, hi) = self.controller.output_limits();
                self.controller.set_bias(self.valve.clamp(lo, hi))?;
            }
        }
        self.mode = mode;
        Ok(())
    }

    /// Request a stop. Returns `false` if already stopped.
    pub fn stop(&mut self) -> bool {
        let stopped = self.clock.stop();
        if stopped {
            tracing::info!(t = self.time(), "simulation stopped");
        }
        stopped
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn time(&self) -> f64 {
        self.clock.time()
    }

    pub fn state(&self) -> &PlantState {
        &self.state
    }

    pub fn controller(&self) -> &PIDController {
        &self.controller
    }

    /// Valve position currently in effect.
    pub fn valve(&self) -> f64 {
        self.valve
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn constants(&self) -> &PlantConstants {
        &self.constants
    }

    /// Snapshot of the current time and state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            sim_time: self.clock.time(),
            reactor_temp: self.state.reactor_temp,
            jacket_temp: self.state.jacket_temp,
            valve_position: self.valve,
            setpoint: self.controller.setpoint(),
        }
    }
}
