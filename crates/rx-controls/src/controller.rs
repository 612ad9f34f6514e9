//! Positional PID controller with anti-windup and bumpless reset.
//!
//! ```text
//! dt       = t - last_time            (0.1 s if dt <= 0)
//! e        = setpoint - pv
//! integral = clamp(integral + e*dt, integral_min, integral_max)
//! out      = clamp(kp*e + ki*integral + kd*(e - last_e)/dt, out_min, out_max)
//! ```
//!
//! [`PIDController::reset`] seeds `integral = bias / ki`, so the first
//! `compute` at zero error returns exactly `bias`.

use crate::error::{ControlError, ControlResult};
use rx_core::numeric::ensure_finite;
use serde::{Deserialize, Serialize};

/// Substitute sample interval when timestamps do not advance.
pub const FALLBACK_DT: f64 = 0.1;

pub const DEFAULT_OUTPUT_LIMITS: (f64, f64) = (0.0, 1.0);
pub const DEFAULT_INTEGRAL_LIMITS: (f64, f64) = (0.0, 1000.0);

/// Proportional, integral and derivative gains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f64,
    /// Must be positive: reset divides by it.
    pub ki: f64,
    pub kd: f64,
}

impl Default for PidGains {
    fn default() -> Self {
        Self {
            kp: 0.05,
            ki: 0.001,
            kd: 0.5,
        }
    }
}

impl PidGains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> ControlResult<Self> {
        let gains = Self { kp, ki, kd };
        gains.validate()?;
        Ok(gains)
    }

    pub fn validate(&self) -> ControlResult<()> {
        ensure_finite(self.kp, "kp")?;
        ensure_finite(self.ki, "ki")?;
        ensure_finite(self.kd, "kd")?;
        if self.ki <= 0.0 {
            return Err(ControlError::InvalidArg {
                what: "ki must be positive",
            });
        }
        Ok(())
    }
}

/// Controller memory carried between `compute` calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PIDControllerState {
    /// Integral accumulator (error·seconds).
    pub integral: f64,
    pub last_error: f64,
    pub last_output: f64,
    /// Timestamp of the last `compute`, seconds.
    pub last_time: f64,
}

/// PID controller.
#[derive(Debug, Clone, PartialEq)]
pub struct PIDController {
    gains: PidGains,
    setpoint: f64,
    bias: f64,
    out_min: f64,
    out_max: f64,
    integral_min: f64,
    integral_max: f64,
    state: PIDControllerState,
}

impl Default for PIDController {
    fn default() -> Self {
        let gains = PidGains::default();
        let bias = 0.433255;
        Self {
            gains,
            setpoint: 31.0,
            bias,
            out_min: DEFAULT_OUTPUT_LIMITS.0,
            out_max: DEFAULT_OUTPUT_LIMITS.1,
            integral_min: DEFAULT_INTEGRAL_LIMITS.0,
            integral_max: DEFAULT_INTEGRAL_LIMITS.1,
            state: seeded_state(bias, gains.ki),
        }
    }
}

fn seeded_state(bias: f64, ki: f64) -> PIDControllerState {
    PIDControllerState {
        integral: bias / ki,
        last_error: 0.0,
        last_output: bias,
        last_time: 0.0,
    }
}

fn check_range(min: f64, max: f64, what: &'static str) -> ControlResult<()> {
    ensure_finite(min, what)?;
    ensure_finite(max, what)?;
    if min >= max {
        return Err(ControlError::InvalidArg { what });
    }
    Ok(())
}

impl PIDController {
    /// Create a controller with output limits `[0, 1]` and integral limits
    /// `[0, 1000]`, already reset to `bias`.
    pub fn new(gains: PidGains, setpoint: f64, bias: f64) -> ControlResult<Self> {
        Self::with_limits(
            gains,
            setpoint,
            bias,
            DEFAULT_OUTPUT_LIMITS,
            DEFAULT_INTEGRAL_LIMITS,
        )
    }

    /// Create a controller with explicit `(min, max)` output and integral
    /// limits, already reset to `bias`.
    pub fn with_limits(
        gains: PidGains,
        setpoint: f64,
        bias: f64,
        output: (f64, f64),
        integral: (f64, f64),
    ) -> ControlResult<Self> {
        gains.validate()?;
        ensure_finite(setpoint, "setpoint")?;
        check_range(output.0, output.1, "output limits must satisfy min < max")?;
        check_range(
            integral.0,
            integral.1,
            "integral limits must satisfy min < max",
        )?;
        let mut controller = Self {
            gains,
            setpoint,
            bias: output.0,
            out_min: output.0,
            out_max: output.1,
            integral_min: integral.0,
            integral_max: integral.1,
            state: seeded_state(output.0, gains.ki),
        };
        controller.set_bias(bias)?;
        Ok(controller)
    }

    /// Replace the output limits. The bias must lie inside them.
    pub fn with_output_limits(mut self, out_min: f64, out_max: f64) -> ControlResult<Self> {
        check_range(out_min, out_max, "output limits must satisfy min < max")?;
        if !(out_min..=out_max).contains(&self.bias) {
            return Err(ControlError::InvalidArg {
                what: "bias must lie within output limits",
            });
        }
        self.out_min = out_min;
        self.out_max = out_max;
        self.reset();
        Ok(self)
    }

    /// Replace the anti-windup limits on the integral accumulator.
    pub fn with_integral_limits(
        mut self,
        integral_min: f64,
        integral_max: f64,
    ) -> ControlResult<Self> {
        check_range(
            integral_min,
            integral_max,
            "integral limits must satisfy min < max",
        )?;
        self.integral_min = integral_min;
        self.integral_max = integral_max;
        self.reset();
        Ok(self)
    }

    /// Compute the clamped controller output for process value `pv` measured
    /// at `time` seconds.
    pub fn compute(&mut self, pv: f64, time: f64) -> f64 {
        let mut dt = time - self.state.last_time;
        if dt <= 0.0 {
            tracing::debug!(
                time,
                last_time = self.state.last_time,
                "non-increasing controller timestamp, using fallback dt"
            );
            dt = FALLBACK_DT;
        }

        let error = self.setpoint - pv;
        let p_term = self.gains.kp * error;

        self.state.integral =
            (self.state.integral + error * dt).clamp(self.integral_min, self.integral_max);
        let i_term = self.gains.ki * self.state.integral;

        let d_term = self.gains.kd * (error - self.state.last_error) / dt;

        let raw = p_term + i_term + d_term;
        let output = raw.clamp(self.out_min, self.out_max);

        tracing::trace!(
            time,
            pv,
            setpoint = self.setpoint,
            error,
            p_term,
            i_term,
            d_term,
            integral = self.state.integral,
            raw,
            output,
            "pid compute"
        );

        self.state.last_error = error;
        self.state.last_time = time;
        self.state.last_output = output;
        output
    }

    /// Re-seed the controller so the next zero-error `compute` returns `bias`.
    pub fn reset(&mut self) {
        self.state = seeded_state(self.bias, self.gains.ki);
        if !(self.integral_min..=self.integral_max).contains(&self.state.integral) {
            tracing::warn!(
                integral = self.state.integral,
                integral_min = self.integral_min,
                integral_max = self.integral_max,
                "bias / ki lies outside the integral limits; next output will be clamped"
            );
        }
    }

    /// Swap gains in place. The stored integral is kept as is.
    ///
    /// Invalid gains are rejected and the previous gains stay active.
    pub fn set_gains(&mut self, gains: PidGains) -> ControlResult<()> {
        gains.validate()?;
        self.gains = gains;
        Ok(())
    }

    /// Change the setpoint. A changed value resets the controller.
    ///
    /// Returns `true` if the setpoint changed.
    pub fn set_setpoint(&mut self, setpoint: f64) -> ControlResult<bool> {
        ensure_finite(setpoint, "setpoint")?;
        if setpoint == self.setpoint {
            return Ok(false);
        }
        self.setpoint = setpoint;
        self.reset();
        Ok(true)
    }

    /// Change the bias output used by [`reset`](Self::reset) and reset.
    pub fn set_bias(&mut self, bias: f64) -> ControlResult<()> {
        ensure_finite(bias, "bias")?;
        if !(self.out_min..=self.out_max).contains(&bias) {
            return Err(ControlError::InvalidArg {
                what: "bias must lie within output limits",
            });
        }
        self.bias = bias;
        self.reset();
        Ok(())
    }

    pub fn gains(&self) -> PidGains {
        self.gains
    }

    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn output_limits(&self) -> (f64, f64) {
        (self.out_min, self.out_max)
    }

    pub fn integral_limits(&self) -> (f64, f64) {
        (self.integral_min, self.integral_max)
    }

    pub fn state(&self) -> &PIDControllerState {
        &self.state
    }

    pub fn last_output(&self) -> f64 {
        self.state.last_output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    fn reference_controller() -> PIDController {
        PIDController::new(PidGains::new(0.05, 0.001, 0.5).unwrap(), 31.0, 0.433255).unwrap()
    }

    #[test]
    fn default_matches_reference_tuning() {
        assert_eq!(PIDController::default(), reference_controller());
    }

    #[test]
    fn bumpless_after_reset() {
        let mut pid = reference_controller();
        let out = pid.compute(31.0, 0.0);
        assert!((out - 0.433255).abs() < TOL, "out = {out}");
        assert!((pid.state().integral - 433.255).abs() < 1e-9);
    }

    #[test]
    fn saturates_on_large_error() {
        let mut pid = reference_controller();
        pid.compute(31.0, 0.0);
        let out = pid.compute(25.0, 1.0);
        // Raw sum: 0.3 + 0.439255 + 3.0 = 3.739255
        assert_eq!(out, 1.0);
        assert!((pid.state().integral - 439.255).abs() < 1e-9);
        assert_eq!(pid.state().last_error, 6.0);
        assert_eq!(pid.last_output(), 1.0);
    }

    #[test]
    fn unsaturated_terms_add_up() {
        let mut pid = reference_controller();
        pid.compute(31.0, 0.0);
        // e = 0.5, dt = 1: P = 0.025, I = 0.001 * 433.755, D = 0.5 * 0.5
        let out = pid.compute(30.5, 1.0);
        let expected = 0.025 + 0.433755 + 0.25;
        assert!((out - expected).abs() < 1e-9, "out = {out}");
    }

    #[test]
    fn non_increasing_timestamp_uses_fallback_dt() {
        let mut pid = reference_controller();
        pid.compute(31.0, 5.0);
        let before = pid.state().integral;
        pid.compute(30.0, 5.0);
        // e = 1 integrated over the 0.1 s fallback
        assert!((pid.state().integral - (before + 0.1)).abs() < 1e-9);
        pid.compute(30.0, 2.0);
        assert!((pid.state().integral - (before + 0.2)).abs() < 1e-9);
    }

    #[test]
    fn integral_is_bounded_under_sustained_error() {
        let mut pid = reference_controller();
        for k in 1..=5000 {
            pid.compute(0.0, k as f64);
            assert!(pid.state().integral <= 1000.0);
        }
        assert_eq!(pid.state().integral, 1000.0);

        for k in 5001..=10_000 {
            pid.compute(100.0, k as f64);
            assert!(pid.state().integral >= 0.0);
        }
        assert_eq!(pid.state().integral, 0.0);
    }

    #[test]
    fn setpoint_change_resets_for_bumpless_transfer() {
        let mut pid = reference_controller();
        for k in 1..=50 {
            pid.compute(28.0, k as f64);
        }
        assert!(pid.state().integral > 433.255);

        assert!(pid.set_setpoint(40.0).unwrap());
        assert_eq!(pid.state().last_time, 0.0);
        let out = pid.compute(40.0, 51.0);
        assert!((out - 0.433255).abs() < TOL, "out = {out}");
    }

    #[test]
    fn unchanged_setpoint_does_not_reset() {
        let mut pid = reference_controller();
        pid.compute(30.0, 1.0);
        let state = pid.state().clone();
        assert!(!pid.set_setpoint(31.0).unwrap());
        assert_eq!(pid.state(), &state);
    }

    #[test]
    fn gain_swap_keeps_integral() {
        let mut pid = reference_controller();
        pid.compute(30.0, 1.0);
        let integral = pid.state().integral;
        pid.set_gains(PidGains::new(0.1, 0.002, 0.0).unwrap()).unwrap();
        assert_eq!(pid.state().integral, integral);
        assert_eq!(pid.gains().kp, 0.1);
    }

    #[test]
    fn invalid_gains_are_rejected_and_previous_kept() {
        let mut pid = reference_controller();
        let err = pid
            .set_gains(PidGains {
                kp: 1.0,
                ki: 0.0,
                kd: 0.0,
            })
            .unwrap_err();
        assert!(matches!(err, ControlError::InvalidArg { .. }));
        assert!(
            pid.set_gains(PidGains {
                kp: f64::NAN,
                ki: 0.1,
                kd: 0.0
            })
            .is_err()
        );
        assert_eq!(pid.gains(), PidGains::default());
    }

    #[test]
    fn invalid_construction() {
        assert!(PidGains::new(1.0, -0.1, 0.0).is_err());
        assert!(PIDController::new(PidGains::default(), f64::NAN, 0.5).is_err());
        assert!(PIDController::new(PidGains::default(), 31.0, 1.5).is_err());
        assert!(
            reference_controller()
                .with_output_limits(1.0, 0.0)
                .is_err()
        );
        assert!(
            reference_controller()
                .with_output_limits(0.5, 1.0)
                .is_err(),
            "bias 0.433 lies below the new lower limit"
        );
        assert!(
            reference_controller()
                .with_integral_limits(10.0, 10.0)
                .is_err()
        );
    }

    #[test]
    fn explicit_limits() {
        let pid =
            PIDController::with_limits(PidGains::default(), 31.0, 1.5, (1.0, 2.0), (0.0, 5000.0))
                .unwrap();
        assert_eq!(pid.output_limits(), (1.0, 2.0));
        assert_eq!(pid.integral_limits(), (0.0, 5000.0));
        assert_eq!(pid.last_output(), 1.5);
        assert!(
            PIDController::with_limits(PidGains::default(), 31.0, 0.5, (1.0, 2.0), (0.0, 1.0))
                .is_err()
        );
    }

    #[test]
    fn set_bias_reseeds() {
        let mut pid = reference_controller();
        pid.set_bias(0.8).unwrap();
        let out = pid.compute(31.0, 3.0);
        assert!((out - 0.8).abs() < TOL);
        assert!(pid.set_bias(-0.1).is_err());
        assert_eq!(pid.bias(), 0.8);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn output_and_integral_stay_bounded(
            samples in prop::collection::vec((-50.0_f64..150.0, -5.0_f64..20.0), 1..200),
            kp in -1.0_f64..1.0,
            ki in 1e-4_f64..0.1,
            kd in -1.0_f64..1.0,
        ) {
            let mut pid = PIDController::new(PidGains::new(kp, ki, kd).unwrap(), 31.0, 0.5)
                .unwrap()
                .with_integral_limits(-200.0, 200.0)
                .unwrap();
            let mut time = 0.0;
            for (pv, step) in samples {
                time += step;
                let out = pid.compute(pv, time);
                prop_assert!((0.0..=1.0).contains(&out));
                prop_assert!((-200.0..=200.0).contains(&pid.state().integral));
                prop_assert_eq!(pid.last_output(), out);
            }
        }

        #[test]
        fn reset_reproduces_any_bias(
            bias in 0.001_f64..0.999,
            ki in 1e-3_f64..1.0,
            setpoint in 0.0_f64..100.0,
        ) {
            let mut pid = PIDController::new(PidGains::new(0.05, ki, 0.5).unwrap(), setpoint, bias)
                .unwrap();
            let out = pid.compute(setpoint, 0.0);
            prop_assert!((out - bias).abs() < 1e-9);
        }
    }
}
