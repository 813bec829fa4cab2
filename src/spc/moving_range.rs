//! Two-pass screened moving-range dispersion estimate.
//!
//! Shared by the I chart (applied to the raw observations) and by the prime
//! limits of the P and U charts (applied to standardized z-values).
//!
//! # Algorithm
//!
//! 1. MR_i = |x_i - x_{i-1}| for i = 1..n (the first point has none).
//! 2. MR-bar_0 = sum(MR) / (n - 1).
//! 3. UL_MR = D4 * MR-bar_0.
//! 4. MR-bar = mean of the MR_i with MR_i <= UL_MR.
//!
//! # References
//!
//! - Provost, L.P. & Murray, S.K. (2011). *The Health Care Data Guide*,
//!   Chapter 5 (screening of moving ranges) and Chapter 8 (prime charts).
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.,
//!   Chapter 6: Control Charts for Variables.

use serde::{Deserialize, Serialize};
use u_numflow::stats;

use crate::error::{Result, ShewhartError};

/// Screening multiplier applied to MR-bar_0: D4 for span 2 (3.267), as
/// tabulated to two decimals in The Health Care Data Guide.
pub const D4_SCREEN: f64 = 3.27;

/// E2 for span 2: individuals limit width per unit of MR-bar (3 / d2).
pub const E2: f64 = 2.66;

/// d2 for span 2: expected range of two standard normals.
pub const D2: f64 = 1.128;

/// Named chart constants used by limit computation.
///
/// Defaults are the standard span-2 values; they are parameters rather than
/// literals so alternative tabulations can be supplied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningConstants {
    /// Moving-range screening multiplier.
    pub d4: f64,
    /// Individuals limit multiplier applied to MR-bar.
    pub e2: f64,
    /// Divisor converting MR-bar of z-values into a sigma multiplier.
    pub d2: f64,
    /// Sigma width of P and U limits.
    pub sigma: f64,
}

impl Default for ScreeningConstants {
    fn default() -> Self {
        Self {
            d4: D4_SCREEN,
            e2: E2,
            d2: D2,
            sigma: 3.0,
        }
    }
}

impl ScreeningConstants {
    /// Reject non-finite or non-positive constants.
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [
            ("d4", self.d4),
            ("e2", self.e2),
            ("d2", self.d2),
            ("sigma", self.sigma),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(ShewhartError::configuration(format!(
                    "chart constant {name} must be finite and > 0, got {v}"
                )));
            }
        }
        Ok(())
    }
}

/// Result of the two-pass moving-range screen for one group.
#[derive(Debug, Clone, PartialEq)]
pub struct MovingRangeScreen {
    /// MR_1..MR_{n-1}, aligned so `moving_ranges[i]` belongs to point `i + 1`.
    pub moving_ranges: Vec<f64>,
    /// Unscreened mean moving range, MR-bar_0.
    pub initial_mr_bar: f64,
    /// Screening threshold, D4 * MR-bar_0.
    pub upper_limit: f64,
    /// Mean of the retained moving ranges, MR-bar.
    pub mr_bar: f64,
    /// Number of moving ranges at or below the threshold.
    pub retained: usize,
}

impl MovingRangeScreen {
    /// Number of moving ranges discarded by the screen.
    pub fn excluded(&self) -> usize {
        self.moving_ranges.len() - self.retained
    }
}

/// Absolute differences between consecutive values.
pub fn moving_ranges(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| (w[1] - w[0]).abs()).collect()
}

/// Screened mean moving range of an ordered sequence.
///
/// # Errors
///
/// - `Division` if `values` has fewer than two points (no moving range) or
///   holds non-finite values.
pub fn screen_moving_ranges(values: &[f64], d4: f64) -> Result<MovingRangeScreen> {
    if values.len() < 2 {
        return Err(ShewhartError::division(format!(
            "moving range needs at least 2 observations, got {}",
            values.len()
        )));
    }

    let mr = moving_ranges(values);
    let initial_mr_bar = stats::mean(&mr)
        .ok_or_else(|| ShewhartError::division("moving ranges contain non-finite values"))?;
    let upper_limit = d4 * initial_mr_bar;

    let kept: Vec<f64> = mr.iter().copied().filter(|&r| r <= upper_limit).collect();
    let mr_bar = stats::mean(&kept).ok_or_else(|| {
        ShewhartError::division("every moving range exceeded the screening limit")
    })?;

    tracing::trace!(
        n = values.len(),
        initial_mr_bar,
        upper_limit,
        mr_bar,
        excluded = mr.len() - kept.len(),
        "screened moving ranges"
    );

    Ok(MovingRangeScreen {
        retained: kept.len(),
        moving_ranges: mr,
        initial_mr_bar,
        upper_limit,
        mr_bar,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moving_ranges() {
        let ranges = moving_ranges(&[10.0, 12.0, 11.0, 50.0, 9.0]);
        assert_eq!(ranges, vec![2.0, 1.0, 39.0, 41.0]);
        assert!(moving_ranges(&[1.0]).is_empty());
    }

    #[test]
    fn test_screen_worked_example() {
        let s = screen_moving_ranges(&[10.0, 12.0, 11.0, 50.0, 9.0], D4_SCREEN).unwrap();
        assert!((s.initial_mr_bar - 20.75).abs() < 1e-12);
        assert!((s.upper_limit - 67.8525).abs() < 1e-9);
        // 39 and 41 are below 67.85, so nothing is screened here.
        assert_eq!(s.retained, 4);
        assert!((s.mr_bar - 20.75).abs() < 1e-12);
    }

    #[test]
    fn test_screen_drops_extreme_jump() {
        let values = [5.0, 6.0, 5.0, 6.0, 5.0, 6.0, 5.0, 6.0, 5.0, 6.0, 60.0];
        let s = screen_moving_ranges(&values, D4_SCREEN).unwrap();
        // MR = nine 1s and one 54: MR-bar_0 = 6.3, UL = 20.601.
        assert!((s.initial_mr_bar - 6.3).abs() < 1e-12);
        assert_eq!(s.excluded(), 1);
        assert!((s.mr_bar - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_screen_constant_series() {
        let s = screen_moving_ranges(&[4.0; 6], D4_SCREEN).unwrap();
        assert_eq!(s.mr_bar, 0.0);
        assert_eq!(s.retained, 5);
    }

    #[test]
    fn test_screen_two_points() {
        let s = screen_moving_ranges(&[1.0, 3.5], D4_SCREEN).unwrap();
        assert!((s.mr_bar - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_single_point_is_division_error() {
        let err = screen_moving_ranges(&[1.0], D4_SCREEN).unwrap_err();
        assert!(matches!(err, ShewhartError::Division(_)));
        let err = screen_moving_ranges(&[], D4_SCREEN).unwrap_err();
        assert!(matches!(err, ShewhartError::Division(_)));
    }

    #[test]
    fn test_non_finite_is_division_error() {
        let err = screen_moving_ranges(&[1.0, f64::NAN, 2.0], D4_SCREEN).unwrap_err();
        assert!(matches!(err, ShewhartError::Division(_)));
    }

    #[test]
    fn test_constants_default_and_validate() {
        let c = ScreeningConstants::default();
        assert_eq!(c.d4, 3.27);
        assert_eq!(c.e2, 2.66);
        assert_eq!(c.d2, 1.128);
        assert_eq!(c.sigma, 3.0);
        assert!(c.validate().is_ok());

        let bad = ScreeningConstants { d2: 0.0, ..c };
        assert!(matches!(
            bad.validate(),
            Err(ShewhartError::Configuration(_))
        ));
        let bad = ScreeningConstants { e2: f64::NAN, ..c };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_e2_matches_three_over_d2() {
        assert!((E2 - 3.0 / D2).abs() < 0.01);
    }
}
