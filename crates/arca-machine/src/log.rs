//! Log-domain arithmetic for probability computations.
//!
//! `log_add`/`log_sub` compute `ln(e^a + e^b)` / `ln(e^a - e^b)` without
//! leaving the log domain. Invalid numeric input is surfaced as a structured
//! [`MachineError`] carrying the operands.

use crate::error::{MachineError, MachineResult};

/// ln(2π).
pub const LOG_2PI: f64 = 1.837_877_066_409_345_3;

/// The log-domain representation of probability zero.
pub const LOG_ZERO: f64 = -f64::MAX;

/// The log-domain representation of probability one.
pub const LOG_ONE: f64 = 0.0;

/// Below this difference the smaller operand no longer moves the result.
pub const MINUS_LOG_THRESHOLD: f64 = -39.14;

/// `ln(e^log_a + e^log_b)`, computed against the larger operand.
pub fn log_add(log_a: f64, log_b: f64) -> MachineResult<f64> {
    let (log_a, log_b) = if log_a < log_b {
        (log_b, log_a)
    } else {
        (log_a, log_b)
    };
    let minus_dif = log_b - log_a;
    if minus_dif.is_nan() {
        return Err(MachineError::NotANumber {
            op: "log_add",
            log_a,
            log_b,
        });
    }
    if minus_dif < MINUS_LOG_THRESHOLD {
        Ok(log_a)
    } else {
        Ok(log_a + minus_dif.exp().ln_1p())
    }
}

/// `ln(e^log_a - e^log_b)`; requires `log_a >= log_b`.
pub fn log_sub(log_a: f64, log_b: f64) -> MachineResult<f64> {
    if log_a < log_b {
        return Err(MachineError::LogSubOrder { log_a, log_b });
    }
    let minus_dif = log_b - log_a;
    if minus_dif.is_nan() {
        return Err(MachineError::NotANumber {
            op: "log_sub",
            log_a,
            log_b,
        });
    }
    if log_a == log_b {
        Ok(LOG_ZERO)
    } else if minus_dif < MINUS_LOG_THRESHOLD {
        Ok(log_a)
    } else {
        Ok(log_a + (-minus_dif.exp()).ln_1p())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn log_add_matches_direct_computation() {
        let a: f64 = 0.5;
        let b: f64 = 0.25;
        let expected = (a + b).ln();
        assert!(close(log_add(a.ln(), b.ln()).unwrap(), expected));
    }

    #[test]
    fn log_add_is_commutative() {
        let x = log_add(-2.0, -5.0).unwrap();
        let y = log_add(-5.0, -2.0).unwrap();
        assert!(close(x, y));
    }

    #[test]
    fn log_add_far_apart_returns_larger() {
        assert_eq!(log_add(0.0, -100.0).unwrap(), 0.0);
    }

    #[test]
    fn log_add_nan_rejected() {
        let err = log_add(f64::NAN, 0.0).unwrap_err();
        assert!(matches!(err, MachineError::NotANumber { op: "log_add", .. }));
    }

    #[test]
    fn log_sub_matches_direct_computation() {
        let a: f64 = 0.75;
        let b: f64 = 0.25;
        let expected = (a - b).ln();
        assert!(close(log_sub(a.ln(), b.ln()).unwrap(), expected));
    }

    #[test]
    fn log_sub_equal_operands_is_log_zero() {
        assert_eq!(log_sub(-3.0, -3.0).unwrap(), LOG_ZERO);
    }

    #[test]
    fn log_sub_order_enforced() {
        let err = log_sub(-5.0, -2.0).unwrap_err();
        assert!(matches!(err, MachineError::LogSubOrder { .. }));
    }

    #[test]
    fn log_sub_far_apart_returns_larger() {
        assert_eq!(log_sub(0.0, -100.0).unwrap(), 0.0);
    }

    #[test]
    fn constants() {
        assert!(close(LOG_2PI, (2.0 * std::f64::consts::PI).ln()));
        assert_eq!(LOG_ONE, 0.0);
        assert!(LOG_ZERO < MINUS_LOG_THRESHOLD);
    }
}
