//! TransientModel trait for the integrators.

use crate::error::SimResult;
use rx_core::Tolerances;

/// A dynamic system `x_dot = f(t, x)` the integrators can advance.
///
/// Besides the right-hand side, the model supplies the vector arithmetic the
/// integrators need (add, scale) and the scaled error norm used by adaptive
/// step control.
pub trait TransientModel {
    /// State type (must be Clone).
    type State: Clone;

    /// Compute state derivative dxdt = f(t, x).
    ///
    /// Takes &mut self so models may cache between calls.
    fn rhs(&mut self, t: f64, x: &Self::State) -> SimResult<Self::State>;

    /// Add two states element-wise: result = a + b.
    fn add(&self, a: &Self::State, b: &Self::State) -> Self::State;

    /// Scale a state by a scalar: result = scale * a.
    fn scale(&self, a: &Self::State, scale: f64) -> Self::State;

    /// RMS of `err` with each component scaled by
    /// `tol.abs + tol.rel * max(|a_i|, |b_i|)`.
    fn error_norm(
        &self,
        err: &Self::State,
        a: &Self::State,
        b: &Self::State,
        tol: Tolerances,
    ) -> SimResult<f64>;
}
