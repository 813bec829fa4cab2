//! Special-cause weights.
//!
//! A weight measures how far a point lies outside its limits, in units of
//! the distance from the center line to the violated limit:
//!
//! - `0` when `lcl <= value <= ucl`
//! - `-(lcl - value) / (cl - lcl)` below the lower limit
//! - `(value - ucl) / (ucl - cl)` above the upper limit
//!
//! A weight of `-1` therefore means the point sits as far below the lower
//! limit as the lower limit sits below the center.

use super::chart::ControlLimits;
use crate::error::{Result, ShewhartError};

/// Signed special-cause weight of `value` against `limits`.
///
/// # Errors
///
/// `Division` if the point is outside a limit that coincides with the center
/// line (zero dispersion), where the weight is undefined.
pub fn special_cause_weight(value: f64, limits: &ControlLimits) -> Result<f64> {
    if limits.contains(value) {
        Ok(0.0)
    } else if value < limits.lcl {
        let span = limits.cl - limits.lcl;
        if span <= 0.0 {
            return Err(ShewhartError::division(format!(
                "value {value} is below lcl {} but the lower limit equals the center line",
                limits.lcl
            )));
        }
        Ok(-(limits.lcl - value) / span)
    } else if value > limits.ucl {
        let span = limits.ucl - limits.cl;
        if span <= 0.0 {
            return Err(ShewhartError::division(format!(
                "value {value} is above ucl {} but the upper limit equals the center line",
                limits.ucl
            )));
        }
        Ok((value - limits.ucl) / span)
    } else {
        Err(ShewhartError::division(format!(
            "cannot score {value} against limits {limits:?}"
        )))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn sign_matches_side(
            cl in -1e3_f64..1e3,
            half in 1e-3_f64..1e3,
            value in -5e3_f64..5e3,
        ) {
            let limits = ControlLimits::symmetric(cl, half);
            let w = special_cause_weight(value, &limits).expect("non-zero span");
            if value < limits.lcl {
                prop_assert!(w < 0.0, "below lcl gave {w}");
            } else if value > limits.ucl {
                prop_assert!(w > 0.0, "above ucl gave {w}");
            } else {
                prop_assert_eq!(w, 0.0);
            }
        }
    }
}
