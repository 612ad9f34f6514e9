//! Turn a validated scenario into a simulation setup and an edit schedule.

use crate::error::CliResult;
use rx_controls::{PIDController, PidGains};
use rx_project::{ControlModeDef, EditDef, IntegratorDef, PacingDef, Scenario};
use rx_sim::{ControlMode, IntegratorType, Pacing, ParameterUpdate, SimSetup, SolverOptions};
use std::collections::VecDeque;

/// Fraction of `dt` by which a tick boundary may fall short of an edit time
/// and still count as reaching it.
const BOUNDARY_SLACK: f64 = 1e-9;

pub fn control_mode(mode: ControlModeDef) -> ControlMode {
    match mode {
        ControlModeDef::OpenLoop => ControlMode::OpenLoop,
        ControlModeDef::ClosedLoop => ControlMode::ClosedLoop,
    }
}

fn pacing(pacing: PacingDef) -> Pacing {
    match pacing {
        PacingDef::RealTime => Pacing::RealTime,
        PacingDef::Batch => Pacing::Batch,
    }
}

fn integrator(integrator: IntegratorDef) -> IntegratorType {
    match integrator {
        IntegratorDef::DormandPrince45 => IntegratorType::DormandPrince45,
        IntegratorDef::Rk4 => IntegratorType::RK4,
    }
}

pub fn build_setup(scenario: &Scenario) -> CliResult<SimSetup> {
    let pid = &scenario.control.pid;
    let controller = PIDController::with_limits(
        PidGains::new(pid.kp, pid.ki, pid.kd)?,
        pid.setpoint_c,
        pid.bias,
        (pid.out_min, pid.out_max),
        (pid.integral_min, pid.integral_max),
    )?;

    Ok(SimSetup {
        constants: scenario.plant.to_constants(),
        initial: scenario.initial.to_state(),
        controller,
        mode: control_mode(scenario.control.mode),
        valve: scenario.control.valve,
        dt: scenario.clock.dt_s,
        pacing: pacing(scenario.clock.pacing),
        solver: SolverOptions {
            integrator: integrator(scenario.solver.integrator),
            rtol: scenario.solver.rtol,
            atol: scenario.solver.atol,
            max_substeps: scenario.solver.max_substeps,
        },
    })
}

/// Updates carried by one scheduled edit. The mode switch goes first so an
/// edit can switch to open loop and set the valve together.
pub fn edit_updates(edit: &EditDef) -> Vec<ParameterUpdate> {
    let mut updates = Vec::new();
    if let Some(mode) = edit.mode {
        updates.push(ParameterUpdate::Mode(control_mode(mode)));
    }
    if let Some(sp) = edit.setpoint_c {
        updates.push(ParameterUpdate::Setpoint(sp));
    }
    if let Some(kp) = edit.kp {
        updates.push(ParameterUpdate::Kp(kp));
    }
    if let Some(ki) = edit.ki {
        updates.push(ParameterUpdate::Ki(ki));
    }
    if let Some(kd) = edit.kd {
        updates.push(ParameterUpdate::Kd(kd));
    }
    if let Some(valve) = edit.valve {
        updates.push(ParameterUpdate::Valve(valve));
    }
    updates
}

/// Scheduled edits, released at the first tick boundary at or after their time.
#[derive(Debug, Clone)]
pub struct EditSchedule {
    pending: VecDeque<(f64, Vec<ParameterUpdate>)>,
    slack: f64,
}

impl EditSchedule {
    pub fn new(edits: &[EditDef], dt: f64) -> Self {
        let mut sorted: Vec<&EditDef> = edits.iter().collect();
        sorted.sort_by(|a, b| a.at_s.total_cmp(&b.at_s));
        Self {
            pending: sorted
                .into_iter()
                .map(|e| (e.at_s, edit_updates(e)))
                .collect(),
            slack: BOUNDARY_SLACK * dt,
        }
    }

    /// Remove and return every update due at simulated time `now`, in
    /// schedule order.
    pub fn due(&mut self, now: f64) -> Vec<ParameterUpdate> {
        let mut updates = Vec::new();
        while let Some((at, _)) = self.pending.front() {
            if *at > now + self.slack {
                break;
            }
            if let Some((_, batch)) = self.pending.pop_front() {
                updates.extend(batch);
            }
        }
        updates
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(at_s: f64) -> EditDef {
        EditDef {
            at_s,
            ..EditDef::default()
        }
    }

    #[test]
    fn default_scenario_builds_default_setup() {
        let setup = build_setup(&Scenario::default()).unwrap();
        let reference = SimSetup::default();
        assert_eq!(setup.constants, reference.constants);
        assert_eq!(setup.initial, reference.initial);
        assert_eq!(setup.controller, reference.controller);
        assert_eq!(setup.mode, reference.mode);
        assert_eq!(setup.dt, reference.dt);
        assert_eq!(setup.solver, reference.solver);
    }

    #[test]
    fn mode_switch_precedes_valve() {
        let updates = edit_updates(&EditDef {
            mode: Some(ControlModeDef::OpenLoop),
            valve: Some(0.9),
            kp: Some(0.2),
            ..edit(10.0)
        });
        assert_eq!(
            updates,
            vec![
                ParameterUpdate::Mode(ControlMode::OpenLoop),
                ParameterUpdate::Kp(0.2),
                ParameterUpdate::Valve(0.9),
            ]
        );
    }

    #[test]
    fn edits_release_at_first_boundary_at_or_after_time() {
        let edits = vec![
            EditDef {
                setpoint_c: Some(40.0),
                ..edit(2.5)
            },
            EditDef {
                kp: Some(0.1),
                ..edit(0.0)
            },
            EditDef {
                kd: Some(0.0),
                ..edit(0.3)
            },
        ];
        let mut schedule = EditSchedule::new(&edits, 0.1);

        assert_eq!(schedule.due(0.0), vec![ParameterUpdate::Kp(0.1)]);
        assert!(schedule.due(0.1 * 2.0).is_empty());
        // 3 * 0.1 rounds above 0.3; slack covers boundaries that round below.
        assert_eq!(schedule.due(0.1 * 3.0), vec![ParameterUpdate::Kd(0.0)]);
        assert!(schedule.due(2.4).is_empty());
        assert_eq!(schedule.due(2.6), vec![ParameterUpdate::Setpoint(40.0)]);
        assert!(schedule.is_empty());
    }
}
