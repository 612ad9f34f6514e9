//! Scenario file schema.
//!
//! Every section has `#[serde(default)]`, so a file only needs the values it
//! changes and an empty document is the default scenario.

use rx_controls::PIDController;
use rx_plant::{DEFAULT_VALVE_POSITION, PlantConstants, PlantState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Scenario {
    pub version: u32,
    pub name: String,
    pub plant: PlantDef,
    pub initial: InitialDef,
    pub control: ControlDef,
    pub clock: ClockDef,
    pub solver: SolverDef,
    /// Operator edits applied at scheduled simulated times.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub edits: Vec<EditDef>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            version: crate::migrate::LATEST_VERSION,
            name: "default".to_string(),
            plant: PlantDef::default(),
            initial: InitialDef::default(),
            control: ControlDef::default(),
            clock: ClockDef::default(),
            solver: SolverDef::default(),
            edits: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlantDef {
    pub heat_capacity_j_per_kg_k: f64,
    pub density_kg_per_m3: f64,
    pub heat_transfer_coeff_w_per_m2_k: f64,
    pub heat_transfer_area_m2: f64,
    pub vessel_volume_m3: f64,
    pub jacket_volume_m3: f64,
    pub max_cold_flow_kg_per_s: f64,
    pub max_hot_flow_kg_per_s: f64,
    pub cold_temp_c: f64,
    pub hot_temp_c: f64,
    pub feed_flow_kg_per_s: f64,
    pub feed_temp_c: f64,
}

impl Default for PlantDef {
    fn default() -> Self {
        Self::from(&PlantConstants::default())
    }
}

impl From<&PlantConstants> for PlantDef {
    fn from(c: &PlantConstants) -> Self {
        Self {
            heat_capacity_j_per_kg_k: c.heat_capacity,
            density_kg_per_m3: c.density,
            heat_transfer_coeff_w_per_m2_k: c.heat_transfer_coeff,
            heat_transfer_area_m2: c.heat_transfer_area,
            vessel_volume_m3: c.vessel_volume,
            jacket_volume_m3: c.jacket_volume,
            max_cold_flow_kg_per_s: c.max_cold_flow,
            max_hot_flow_kg_per_s: c.max_hot_flow,
            cold_temp_c: c.cold_temp,
            hot_temp_c: c.hot_temp,
            feed_flow_kg_per_s: c.feed_flow,
            feed_temp_c: c.feed_temp,
        }
    }
}

impl PlantDef {
    /// Unvalidated plant constants.
    pub fn to_constants(&self) -> PlantConstants {
        PlantConstants {
            heat_capacity: self.heat_capacity_j_per_kg_k,
            density: self.density_kg_per_m3,
            heat_transfer_coeff: self.heat_transfer_coeff_w_per_m2_k,
            heat_transfer_area: self.heat_transfer_area_m2,
            vessel_volume: self.vessel_volume_m3,
            jacket_volume: self.jacket_volume_m3,
            max_cold_flow: self.max_cold_flow_kg_per_s,
            max_hot_flow: self.max_hot_flow_kg_per_s,
            cold_temp: self.cold_temp_c,
            hot_temp: self.hot_temp_c,
            feed_flow: self.feed_flow_kg_per_s,
            feed_temp: self.feed_temp_c,
        }
    }

    /// `(field name, value)` for every constant, in file order.
    pub fn fields(&self) -> [(&'static str, f64); 12] {
        [
            ("heat_capacity_j_per_kg_k", self.heat_capacity_j_per_kg_k),
            ("density_kg_per_m3", self.density_kg_per_m3),
            (
                "heat_transfer_coeff_w_per_m2_k",
                self.heat_transfer_coeff_w_per_m2_k,
            ),
            ("heat_transfer_area_m2", self.heat_transfer_area_m2),
            ("vessel_volume_m3", self.vessel_volume_m3),
            ("jacket_volume_m3", self.jacket_volume_m3),
            ("max_cold_flow_kg_per_s", self.max_cold_flow_kg_per_s),
            ("max_hot_flow_kg_per_s", self.max_hot_flow_kg_per_s),
            ("cold_temp_c", self.cold_temp_c),
            ("hot_temp_c", self.hot_temp_c),
            ("feed_flow_kg_per_s", self.feed_flow_kg_per_s),
            ("feed_temp_c", self.feed_temp_c),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InitialDef {
    pub reactor_temp_c: f64,
    pub jacket_temp_c: f64,
}

impl Default for InitialDef {
    fn default() -> Self {
        let state = PlantState::default();
        Self {
            reactor_temp_c: state.reactor_temp,
            jacket_temp_c: state.jacket_temp,
        }
    }
}

impl InitialDef {
    pub fn to_state(&self) -> PlantState {
        PlantState::new(self.reactor_temp_c, self.jacket_temp_c)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ControlModeDef {
    OpenLoop,
    #[default]
    ClosedLoop,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlDef {
    pub mode: ControlModeDef,
    /// Open-loop valve override, fraction hot.
    pub valve: f64,
    pub pid: PidDef,
}

impl Default for ControlDef {
    fn default() -> Self {
        Self {
            mode: ControlModeDef::default(),
            valve: DEFAULT_VALVE_POSITION,
            pid: PidDef::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PidDef {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub setpoint_c: f64,
    /// Output reproduced after a reset at zero error.
    pub bias: f64,
    pub out_min: f64,
    pub out_max: f64,
    pub integral_min: f64,
    pub integral_max: f64,
}

impl Default for PidDef {
    fn default() -> Self {
        let pid = PIDController::default();
        let gains = pid.gains();
        let (out_min, out_max) = pid.output_limits();
        let (integral_min, integral_max) = pid.integral_limits();
        Self {
            kp: gains.kp,
            ki: gains.ki,
            kd: gains.kd,
            setpoint_c: pid.setpoint(),
            bias: pid.bias(),
            out_min,
            out_max,
            integral_min,
            integral_max,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PacingDef {
    RealTime,
    #[default]
    Batch,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClockDef {
    pub dt_s: f64,
    pub pacing: PacingDef,
}

impl Default for ClockDef {
    fn default() -> Self {
        Self {
            dt_s: 1.0,
            pacing: PacingDef::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum IntegratorDef {
    #[default]
    #[serde(rename = "dormand_prince45")]
    DormandPrince45,
    #[serde(rename = "rk4")]
    Rk4,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverDef {
    pub integrator: IntegratorDef,
    pub rtol: f64,
    pub atol: f64,
    pub max_substeps: usize,
}

impl Default for SolverDef {
    fn default() -> Self {
        Self {
            integrator: IntegratorDef::default(),
            rtol: 1e-3,
            atol: 1e-6,
            max_substeps: 100_000,
        }
    }
}

/// A scheduled operator edit. Applied at the first tick boundary at or after
/// `at_s`; every field that is present is applied, in field order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EditDef {
    pub at_s: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ControlModeDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setpoint_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ki: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valve: Option<f64>,
}

impl EditDef {
    pub fn is_empty(&self) -> bool {
        self.mode.is_none()
            && self.setpoint_c.is_none()
            && self.kp.is_none()
            && self.ki.is_none()
            && self.kd.is_none()
            && self.valve.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plant_def_round_trips_constants() {
        let c = PlantConstants::default();
        assert_eq!(PlantDef::from(&c).to_constants(), c);
    }

    #[test]
    fn defaults_match_reference_values() {
        let s = Scenario::default();
        assert_eq!(s.control.pid.kp, 0.05);
        assert_eq!(s.control.pid.ki, 0.001);
        assert_eq!(s.control.pid.kd, 0.5);
        assert_eq!(s.control.pid.setpoint_c, 31.0);
        assert_eq!(s.control.pid.bias, 0.433255);
        assert_eq!(s.control.valve, 0.433255);
        assert_eq!(s.clock.dt_s, 1.0);
        assert_eq!(s.initial.reactor_temp_c, 31.0);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = "name: warm start\ninitial:\n  reactor_temp_c: 45.0\nclock:\n  pacing: realtime\n";
        let s: Scenario = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(s.name, "warm start");
        assert_eq!(s.initial.reactor_temp_c, 45.0);
        assert_eq!(s.initial.jacket_temp_c, InitialDef::default().jacket_temp_c);
        assert_eq!(s.clock.pacing, PacingDef::RealTime);
        assert_eq!(s.plant, PlantDef::default());
    }

    #[test]
    fn edits_parse_optional_fields() {
        let yaml = "edits:\n  - { at_s: 300.0, setpoint_c: 40.0 }\n  - { at_s: 600.0, mode: open_loop, valve: 0.9 }\n";
        let s: Scenario = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(s.edits.len(), 2);
        assert_eq!(s.edits[0].setpoint_c, Some(40.0));
        assert!(s.edits[0].kp.is_none());
        assert_eq!(s.edits[1].mode, Some(ControlModeDef::OpenLoop));
        assert!(!s.edits[1].is_empty());
        assert!(EditDef::default().is_empty());
    }

    #[test]
    fn integrator_names() {
        let s: SolverDef = serde_yaml::from_str("integrator: rk4").unwrap();
        assert_eq!(s.integrator, IntegratorDef::Rk4);
        let text = serde_yaml::to_string(&SolverDef::default()).unwrap();
        assert!(text.contains("dormand_prince45"));
    }
}
