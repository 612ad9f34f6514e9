//! Scenario validation logic.

use crate::schema::{ClockDef, ControlDef, EditDef, PidDef, Scenario, SolverDef};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Empty edit: edits[{index}] changes nothing")]
    EmptyEdit { index: usize },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

impl ValidationError {
    /// Dotted path of the offending field, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::InvalidValue { field, .. } => Some(field),
            _ => None,
        }
    }
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }

    for (name, value) in scenario.plant.fields() {
        validate_positive_finite(&format!("plant.{name}"), value)?;
    }

    validate_finite("initial.reactor_temp_c", scenario.initial.reactor_temp_c)?;
    validate_finite("initial.jacket_temp_c", scenario.initial.jacket_temp_c)?;

    validate_control(&scenario.control)?;
    validate_clock(&scenario.clock)?;
    validate_solver(&scenario.solver)?;

    for (index, edit) in scenario.edits.iter().enumerate() {
        validate_edit(index, edit)?;
    }

    Ok(())
}

fn validate_control(control: &ControlDef) -> Result<(), ValidationError> {
    validate_fraction("control.valve", control.valve)?;
    validate_pid(&control.pid)
}

fn validate_pid(pid: &PidDef) -> Result<(), ValidationError> {
    validate_finite("control.pid.kp", pid.kp)?;
    validate_positive_finite("control.pid.ki", pid.ki)?;
    validate_finite("control.pid.kd", pid.kd)?;
    validate_finite("control.pid.setpoint_c", pid.setpoint_c)?;

    validate_finite("control.pid.out_min", pid.out_min)?;
    validate_finite("control.pid.out_max", pid.out_max)?;
    if pid.out_min >= pid.out_max {
        return Err(invalid(
            "control.pid.out_max",
            pid.out_max,
            "must be greater than out_min",
        ));
    }

    validate_finite("control.pid.integral_min", pid.integral_min)?;
    validate_finite("control.pid.integral_max", pid.integral_max)?;
    if pid.integral_min >= pid.integral_max {
        return Err(invalid(
            "control.pid.integral_max",
            pid.integral_max,
            "must be greater than integral_min",
        ));
    }

    validate_finite("control.pid.bias", pid.bias)?;
    if !(pid.out_min..=pid.out_max).contains(&pid.bias) {
        return Err(invalid(
            "control.pid.bias",
            pid.bias,
            "must lie within [out_min, out_max]",
        ));
    }
    Ok(())
}

fn validate_clock(clock: &ClockDef) -> Result<(), ValidationError> {
    validate_positive_finite("clock.dt_s", clock.dt_s)
}

fn validate_solver(solver: &SolverDef) -> Result<(), ValidationError> {
    validate_positive_finite("solver.rtol", solver.rtol)?;
    validate_positive_finite("solver.atol", solver.atol)?;
    if solver.max_substeps == 0 {
        return Err(invalid("solver.max_substeps", 0, "must be positive"));
    }
    Ok(())
}

fn validate_edit(index: usize, edit: &EditDef) -> Result<(), ValidationError> {
    if !edit.at_s.is_finite() || edit.at_s < 0.0 {
        return Err(invalid(
            &format!("edits[{index}].at_s"),
            edit.at_s,
            "must be non-negative and finite",
        ));
    }
    if edit.is_empty() {
        return Err(ValidationError::EmptyEdit { index });
    }

    let field = |name: &str| format!("edits[{index}].{name}");
    if let Some(sp) = edit.setpoint_c {
        validate_finite(&field("setpoint_c"), sp)?;
    }
    if let Some(kp) = edit.kp {
        validate_finite(&field("kp"), kp)?;
    }
    if let Some(ki) = edit.ki {
        validate_positive_finite(&field("ki"), ki)?;
    }
    if let Some(kd) = edit.kd {
        validate_finite(&field("kd"), kd)?;
    }
    if let Some(valve) = edit.valve {
        validate_fraction(&field("valve"), valve)?;
    }
    Ok(())
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(invalid(field, value, "must be finite"));
    }
    Ok(())
}

fn validate_positive_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(field, value, "must be positive and finite"));
    }
    Ok(())
}

fn validate_fraction(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(invalid(field, value, "must lie within [0, 1]"));
    }
    Ok(())
}
