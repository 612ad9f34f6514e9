use crate::{RxError, RxResult};

/// Floating point type used throughout system
pub type Real = f64;

/// Absolute/relative tolerance pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> RxResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(RxError::NonFinite { what, value: v })
    }
}

/// Reject zero, negative and non-finite values.
pub fn ensure_positive(v: Real, what: &'static str) -> RxResult<Real> {
    let v = ensure_finite(v, what)?;
    if v <= 0.0 {
        return Err(RxError::InvalidArg { what });
    }
    Ok(v)
}

/// Scaled RMS norm of an error vector.
///
/// Each component is divided by `tol.abs + tol.rel * max(|a_i|, |b_i|)` before
/// squaring; a result `<= 1.0` means the error is within tolerance.
pub fn weighted_rms(err: &[Real], a: &[Real], b: &[Real], tol: Tolerances) -> RxResult<Real> {
    if a.len() != err.len() {
        return Err(RxError::LengthMismatch {
            what: "weighted_rms reference a",
            expected: err.len(),
            got: a.len(),
        });
    }
    if b.len() != err.len() {
        return Err(RxError::LengthMismatch {
            what: "weighted_rms reference b",
            expected: err.len(),
            got: b.len(),
        });
    }
    if err.is_empty() {
        return Ok(0.0);
    }

    let sum: Real = err
        .iter()
        .zip(a.iter().zip(b))
        .map(|(e, (a, b))| {
            let scale = tol.abs + tol.rel * a.abs().max(b.abs());
            (e / scale).powi(2)
        })
        .sum();
    Ok((sum / err.len() as Real).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_positive_rejects_zero_and_negative() {
        assert!(ensure_positive(1.0, "x").is_ok());
        assert_eq!(
            ensure_positive(0.0, "x").unwrap_err(),
            RxError::InvalidArg { what: "x" }
        );
        assert!(ensure_positive(-2.0, "x").is_err());
        assert!(ensure_positive(Real::INFINITY, "x").is_err());
    }

    #[test]
    fn weighted_rms_scales_per_component() {
        let tol = Tolerances {
            abs: 1e-6,
            rel: 1e-3,
        };
        // Scale for both components is 1e-6 + 1e-3 * 10 = 0.010001.
        let err = [0.010001, 0.010001];
        let a = [10.0, -10.0];
        let b = [5.0, 10.0];
        let norm = weighted_rms(&err, &a, &b, tol).unwrap();
        assert!((norm - 1.0).abs() < 1e-12);
    }

    #[test]
    fn weighted_rms_rejects_length_mismatch() {
        let tol = Tolerances::default();
        assert!(matches!(
            weighted_rms(&[1.0, 2.0], &[1.0], &[1.0, 2.0], tol),
            Err(RxError::LengthMismatch { expected: 2, got: 1, .. })
        ));
    }

    #[test]
    fn weighted_rms_of_zero_error_is_zero() {
        let tol = Tolerances::default();
        assert_eq!(weighted_rms(&[0.0, 0.0], &[1.0, 2.0], &[3.0, 4.0], tol).unwrap(), 0.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn nearly_equal_is_symmetric(a in -1e6_f64..1e6, b in -1e6_f64..1e6) {
            let tol = Tolerances { abs: 1e-6, rel: 1e-3 };
            prop_assert_eq!(nearly_equal(a, b, tol), nearly_equal(b, a, tol));
        }

        #[test]
        fn weighted_rms_is_linear_in_error(
            err in prop::collection::vec(-10.0_f64..10.0, 1..8),
            factor in 0.0_f64..100.0,
        ) {
            let tol = Tolerances { abs: 1e-6, rel: 1e-3 };
            let refs = vec![1.0; err.len()];
            let scaled: Vec<Real> = err.iter().map(|e| e * factor).collect();
            let base = weighted_rms(&err, &refs, &refs, tol).unwrap();
            let norm = weighted_rms(&scaled, &refs, &refs, tol).unwrap();
            prop_assert!((norm - factor * base).abs() <= 1e-9 * norm.max(1.0));
        }
    }
}
