//! Reactor plant as a [`TransientModel`].

use crate::error::{SimError, SimResult};
use crate::model::TransientModel;
use rx_core::Tolerances;
use rx_core::numeric::weighted_rms;
use rx_plant::{PlantConstants, PlantState, derivative};

/// The plant with the valve position frozen for one integration span.
#[derive(Debug, Clone, Copy)]
pub struct ReactorModel<'a> {
    constants: &'a PlantConstants,
    valve: f64,
}

impl<'a> ReactorModel<'a> {
    pub fn new(constants: &'a PlantConstants, valve: f64) -> Self {
        Self { constants, valve }
    }

    pub fn valve(&self) -> f64 {
        self.valve
    }
}

impl TransientModel for ReactorModel<'_> {
    type State = PlantState;

    fn rhs(&mut self, t: f64, x: &PlantState) -> SimResult<PlantState> {
        let rate = derivative(t, x, self.valve, self.constants);
        if !rate.is_finite() {
            return Err(SimError::Integration {
                t,
                what: format!(
                    "non-finite derivative at T={}, Tj={}",
                    x.reactor_temp, x.jacket_temp
                ),
            });
        }
        Ok(rate)
    }

    fn add(&self, a: &PlantState, b: &PlantState) -> PlantState {
        a.add(b)
    }

    fn scale(&self, a: &PlantState, scale: f64) -> PlantState {
        a.scale(scale)
    }

    fn error_norm(
        &self,
        err: &PlantState,
        a: &PlantState,
        b: &PlantState,
        tol: Tolerances,
    ) -> SimResult<f64> {
        Ok(weighted_rms(
            &err.to_array(),
            &a.to_array(),
            &b.to_array(),
            tol,
        )?)
    }
}
