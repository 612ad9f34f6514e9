//! Energy balances for the reactor contents and the jacket.
//!
//! ```text
//! Fc  = Fmax_cold * (1 - av)
//! Fh  = Fmax_hot  * av
//! Foj = Fc + Fh
//! dT/dt  = [F cp Ti - F cp T + U A (Tj - T)] / (rho cp Vt)
//! dTj/dt = [Fc cp Tc + Fh cp Th - Foj cp Tj + U A (T - Tj)] / (rho cp Vc)
//! ```

use crate::constants::PlantConstants;
use crate::state::PlantState;
use rx_core::units::{Power, Time, kgpm3, kgps, m3, watts};

/// Cold and hot utility mass flows into the jacket, kg/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JacketFlows {
    pub cold: f64,
    pub hot: f64,
}

impl JacketFlows {
    /// Total jacket outflow `Foj`.
    pub fn total(&self) -> f64 {
        self.cold + self.hot
    }
}

/// Split the jacket supply according to valve position `av` (fraction hot).
#[inline]
pub fn jacket_flows(av: f64, c: &PlantConstants) -> JacketFlows {
    JacketFlows {
        cold: c.max_cold_flow * (1.0 - av),
        hot: c.max_hot_flow * av,
    }
}

/// Time derivative of the plant state, returned as `(dT/dt, dTj/dt)` packed in
/// a [`PlantState`].
///
/// `t` is unused (the plant is autonomous) but kept so the signature matches
/// `f(t, y)`. `av` is held constant by the caller for the whole span being
/// integrated.
pub fn derivative(_t: f64, state: &PlantState, av: f64, c: &PlantConstants) -> PlantState {
    let PlantState {
        reactor_temp: t,
        jacket_temp: tj,
    } = *state;
    let cp = c.heat_capacity;
    let ua = c.ua();
    let flows = jacket_flows(av, c);

    let reactor_in = c.feed_flow * cp * c.feed_temp - c.feed_flow * cp * t + ua * (tj - t);
    let jacket_in = flows.cold * cp * c.cold_temp + flows.hot * cp * c.hot_temp
        - flows.total() * cp * tj
        + ua * (t - tj);

    PlantState {
        reactor_temp: reactor_in / c.reactor_capacity(),
        jacket_temp: jacket_in / c.jacket_capacity(),
    }
}

/// Heat flow from the jacket into the reactor contents, `U·A·(Tj − T)`.
pub fn jacket_heat_duty(state: &PlantState, c: &PlantConstants) -> Power {
    watts(c.ua() * (state.jacket_temp - state.reactor_temp))
}

/// Mean residence time of the reactor contents, `ρ·Vt / F`.
pub fn reactor_residence_time(c: &PlantConstants) -> Time {
    kgpm3(c.density) * m3(c.vessel_volume) / kgps(c.feed_flow)
}
