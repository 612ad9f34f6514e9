//! Physical constants of the reactor and its jacket circuit.

use crate::error::PlantResult;
use rx_core::numeric::ensure_positive;
use serde::{Deserialize, Serialize};

/// Valve position at which the default initial state is (nearly) steady.
pub const DEFAULT_VALVE_POSITION: f64 = 0.433255;

/// Immutable plant constants.
///
/// Flows are mass flows (kg/s), temperatures are in °C. All values must be
/// strictly positive; use [`PlantConstants::new`] or
/// [`PlantConstants::validate`] to enforce that.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlantConstants {
    /// Specific heat capacity of all streams, J/(kg·K)
    pub heat_capacity: f64,
    /// Density of all streams, kg/m³
    pub density: f64,
    /// Overall jacket-to-reactor heat-transfer coefficient, W/(m²·K)
    pub heat_transfer_coeff: f64,
    /// Heat-transfer area, m²
    pub heat_transfer_area: f64,
    /// Reactor contents volume, m³
    pub vessel_volume: f64,
    /// Jacket volume, m³
    pub jacket_volume: f64,
    /// Cold utility flow at `av = 0`, kg/s
    pub max_cold_flow: f64,
    /// Hot utility flow at `av = 1`, kg/s
    pub max_hot_flow: f64,
    /// Cold utility supply temperature, °C
    pub cold_temp: f64,
    /// Hot utility supply temperature, °C
    pub hot_temp: f64,
    /// Reactor feed flow, kg/s
    pub feed_flow: f64,
    /// Reactor feed temperature, °C
    pub feed_temp: f64,
}

impl Default for PlantConstants {
    fn default() -> Self {
        Self {
            heat_capacity: 4181.3,
            density: 1000.0,
            heat_transfer_coeff: 15000.0,
            heat_transfer_area: 9.596,
            vessel_volume: 3.0,
            jacket_volume: 0.5047,
            max_cold_flow: 120.0,
            max_hot_flow: 180.0,
            cold_temp: 2.0,
            hot_temp: 95.0,
            feed_flow: 40.0,
            feed_temp: 16.6,
        }
    }
}

impl PlantConstants {
    /// Validate and return `constants`.
    pub fn new(constants: PlantConstants) -> PlantResult<Self> {
        constants.validate()?;
        Ok(constants)
    }

    /// Check that every constant is finite and strictly positive.
    pub fn validate(&self) -> PlantResult<()> {
        ensure_positive(self.heat_capacity, "heat_capacity")?;
        ensure_positive(self.density, "density")?;
        ensure_positive(self.heat_transfer_coeff, "heat_transfer_coeff")?;
        ensure_positive(self.heat_transfer_area, "heat_transfer_area")?;
        ensure_positive(self.vessel_volume, "vessel_volume")?;
        ensure_positive(self.jacket_volume, "jacket_volume")?;
        ensure_positive(self.max_cold_flow, "max_cold_flow")?;
        ensure_positive(self.max_hot_flow, "max_hot_flow")?;
        ensure_positive(self.cold_temp, "cold_temp")?;
        ensure_positive(self.hot_temp, "hot_temp")?;
        ensure_positive(self.feed_flow, "feed_flow")?;
        ensure_positive(self.feed_temp, "feed_temp")?;
        Ok(())
    }

    /// U·A, W/K
    pub fn ua(&self) -> f64 {
        self.heat_transfer_coeff * self.heat_transfer_area
    }

    /// Thermal capacity of the reactor contents, J/K
    pub fn reactor_capacity(&self) -> f64 {
        self.density * self.heat_capacity * self.vessel_volume
    }

    /// Thermal capacity of the jacket contents, J/K
    pub fn jacket_capacity(&self) -> f64 {
        self.density * self.heat_capacity * self.jacket_volume
    }
}
