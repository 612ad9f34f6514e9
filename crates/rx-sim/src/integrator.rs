//! Time integrators.
//!
//! [`DormandPrince45`] is the default: an explicit Runge-Kutta 4(5) pair that
//! subdivides each span adaptively. [`RK4`] takes one classical step per span.

use crate::error::{SimError, SimResult};
use crate::model::TransientModel;
use rx_core::Tolerances;

/// Trait for time integrators.
pub trait Integrator {
    /// Advance `x` from `t` to `t + dt` and return the state at the end of the span.
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State>;
}

fn check_span(t: f64, dt: f64) -> SimResult<()> {
    if !t.is_finite() {
        return Err(SimError::InvalidArg {
            what: "integration start time must be finite",
        });
    }
    if !dt.is_finite() || dt <= 0.0 {
        return Err(SimError::InvalidArg {
            what: "dt must be positive",
        });
    }
    Ok(())
}

/// `base + h * sum(c_i * k_i)`
fn combine<M: TransientModel>(
    model: &M,
    base: &M::State,
    h: f64,
    terms: &[(f64, &M::State)],
) -> M::State {
    terms.iter().fold(base.clone(), |acc, (c, k)| {
        model.add(&acc, &model.scale(k, h * c))
    })
}

// Dormand–Prince tableau.
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th-order weights; these advance the solution.
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Embedded 4th-order weights.
const BS1: f64 = 5179.0 / 57600.0;
const BS3: f64 = 7571.0 / 16695.0;
const BS4: f64 = 393.0 / 640.0;
const BS5: f64 = -92097.0 / 339200.0;
const BS6: f64 = 187.0 / 2100.0;
const BS7: f64 = 1.0 / 40.0;

const E1: f64 = B1 - BS1;
const E3: f64 = B3 - BS3;
const E4: f64 = B4 - BS4;
const E5: f64 = B5 - BS5;
const E6: f64 = B6 - BS6;
const E7: f64 = -BS7;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;
/// -1 / (embedded order + 1)
const ERROR_EXPONENT: f64 = -1.0 / 5.0;

/// Smallest substep allowed at time `t`: ten units in the last place.
fn min_substep(t: f64) -> f64 {
    10.0 * (f64::EPSILON * t.abs()).max(f64::MIN_POSITIVE)
}

/// Adaptive Dormand–Prince 4(5) integrator with local extrapolation.
///
/// Substeps are accepted when the scaled RMS of the difference between the
/// 4th- and 5th-order solutions is below one. Rejected substeps shrink by
/// `0.9 * err^(-1/5)` (at least by a factor of 5); the span fails once the
/// substep falls below ten ulps of `t`.
#[derive(Clone, Debug, PartialEq)]
pub struct DormandPrince45 {
    pub tol: Tolerances,
    /// Upper bound on accepted substeps per span.
    pub max_substeps: usize,
}

impl Default for DormandPrince45 {
    fn default() -> Self {
        Self {
            tol: Tolerances {
                abs: 1e-6,
                rel: 1e-3,
            },
            max_substeps: 100_000,
        }
    }
}

impl DormandPrince45 {
    pub fn new(rtol: f64, atol: f64) -> SimResult<Self> {
        if !rtol.is_finite() || rtol <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "rtol must be positive",
            });
        }
        if !atol.is_finite() || atol <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "atol must be positive",
            });
        }
        Ok(Self {
            tol: Tolerances {
                abs: atol,
                rel: rtol,
            },
            ..Self::default()
        })
    }

    pub fn with_max_substeps(mut self, max_substeps: usize) -> Self {
        self.max_substeps = max_substeps.max(1);
        self
    }

    /// Starting substep from the derivative at the span start and one
    /// explicit Euler probe (Hairer, Nørsett & Wanner, II.4).
    fn initial_substep<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        f0: &M::State,
        span: f64,
    ) -> SimResult<f64> {
        let d0 = model.error_norm(x, x, x, self.tol)?;
        let d1 = model.error_norm(f0, x, x, self.tol)?;
        let h0 = if d0 < 1e-5 || d1 < 1e-5 {
            1e-6
        } else {
            0.01 * d0 / d1
        };
        let h0 = h0.min(span);

        let x1 = combine(model, x, h0, &[(1.0, f0)]);
        let f1 = model.rhs(t + h0, &x1)?;
        let df = model.add(&f1, &model.scale(f0, -1.0));
        let d2 = model.error_norm(&df, x, x, self.tol)? / h0;

        let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
            (h0 * 1e-3).max(1e-6)
        } else {
            (0.01 / d1.max(d2)).powf(-ERROR_EXPONENT)
        };

        Ok((100.0 * h0).min(h1).min(span))
    }
}

impl Integrator for DormandPrince45 {
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State> {
        check_span(t, dt)?;
        let t_end = t + dt;

        let mut t_cur = t;
        let mut x_cur = x.clone();
        let mut k1 = model.rhs(t_cur, &x_cur)?;
        let mut h = self.initial_substep(model, t_cur, &x_cur, &k1, dt)?;

        let mut accepted = 0;
        while t_cur < t_end {
            if accepted == self.max_substeps {
                return Err(SimError::Integration {
                    t: t_cur,
                    what: format!(
                        "exceeded {} substeps before reaching t={t_end}",
                        self.max_substeps
                    ),
                });
            }

            let min_step = min_substep(t_cur);
            h = h.max(min_step);
            let mut rejected = false;

            let (t_new, x_new, k7) = loop {
                if h < min_step {
                    return Err(SimError::Integration {
                        t: t_cur,
                        what: format!("substep {h:e} fell below minimum {min_step:e}"),
                    });
                }

                let t_new = (t_cur + h).min(t_end);
                let h_try = t_new - t_cur;

                let y2 = combine(model, &x_cur, h_try, &[(A21, &k1)]);
                let k2 = model.rhs(t_cur + C2 * h_try, &y2)?;

                let y3 = combine(model, &x_cur, h_try, &[(A31, &k1), (A32, &k2)]);
                let k3 = model.rhs(t_cur + C3 * h_try, &y3)?;

                let y4 = combine(model, &x_cur, h_try, &[(A41, &k1), (A42, &k2), (A43, &k3)]);
                let k4 = model.rhs(t_cur + C4 * h_try, &y4)?;

                let y5 = combine(
                    model,
                    &x_cur,
                    h_try,
                    &[(A51, &k1), (A52, &k2), (A53, &k3), (A54, &k4)],
                );
                let k5 = model.rhs(t_cur + C5 * h_try, &y5)?;

                let y6 = combine(
                    model,
                    &x_cur,
                    h_try,
                    &[(A61, &k1), (A62, &k2), (A63, &k3), (A64, &k4), (A65, &k5)],
                );
                let k6 = model.rhs(t_new, &y6)?;

                let x_new = combine(
                    model,
                    &x_cur,
                    h_try,
                    &[(B1, &k1), (B3, &k3), (B4, &k4), (B5, &k5), (B6, &k6)],
                );
                let k7 = model.rhs(t_new, &x_new)?;

                let err = combine(
                    model,
                    &model.scale(&k1, h_try * E1),
                    h_try,
                    &[(E3, &k3), (E4, &k4), (E5, &k5), (E6, &k6), (E7, &k7)],
                );
                let norm = model.error_norm(&err, &x_cur, &x_new, self.tol)?;

                if norm < 1.0 {
                    let mut factor = if norm == 0.0 {
                        MAX_FACTOR
                    } else {
                        (SAFETY * norm.powf(ERROR_EXPONENT)).min(MAX_FACTOR)
                    };
                    if rejected {
                        factor = factor.min(1.0);
                    }
                    h = h_try * factor;
                    break (t_new, x_new, k7);
                }

                // NaN norms land here too and shrink at the fastest rate.
                let factor = if norm.is_finite() {
                    (SAFETY * norm.powf(ERROR_EXPONENT)).max(MIN_FACTOR)
                } else {
                    MIN_FACTOR
                };
                h = h_try * factor;
                rejected = true;
            };

            t_cur = t_new;
            x_cur = x_new;
            k1 = k7;
            accepted += 1;
        }

        Ok(x_cur)
    }
}

/// Classical RK4 (Runge-Kutta 4th order) integrator, one step per span.
#[derive(Clone, Debug)]
pub struct RK4;

impl Integrator for RK4 {
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State> {
        check_span(t, dt)?;
        let k1 = model.rhs(t, x)?;

        let x2 = model.add(x, &model.scale(&k1, 0.5 * dt));
        let k2 = model.rhs(t + 0.5 * dt, &x2)?;

        let x3 = model.add(x, &model.scale(&k2, 0.5 * dt));
        let k3 = model.rhs(t + 0.5 * dt, &x3)?;

        let x4 = model.add(x, &model.scale(&k3, dt));
        let k4 = model.rhs(t + dt, &x4)?;

        // Combine: x_new = x + (dt/6) * (k1 + 2*k2 + 2*k3 + k4)
        let k_sum = model.add(
            &model.add(&k1, &model.scale(&k2, 2.0)),
            &model.add(&model.scale(&k3, 2.0), &k4),
        );

        Ok(model.add(x, &model.scale(&k_sum, dt / 6.0)))
    }
}
