//! Individuals (I) chart limits.
//!
//! Limits are set per group from the group mean and the screened mean
//! moving range:
//!
//! - CL = X-bar
//! - UCL/LCL = X-bar ± E2 * MR-bar
//!
//! where MR-bar comes from [`screen_moving_ranges`], so a few extreme jumps
//! do not widen the limits. Every row of a group carries the same limits.
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.,
//!   Chapter 6: Control Charts for Variables.
//! - Provost, L.P. & Murray, S.K. (2011). *The Health Care Data Guide*, Chapter 5.

use u_numflow::stats;

use super::chart::{ChartKind, ControlLimits, GroupLimits, LimitSet};
use super::moving_range::{screen_moving_ranges, MovingRangeScreen, ScreeningConstants};
use crate::error::{Result, ShewhartError};
use crate::table::Table;

/// I chart limits for one ordered sequence, with the screen that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct IndividualsLimits {
    /// Center line and limits.
    pub limits: ControlLimits,
    /// Moving-range screen over the sequence.
    pub screen: MovingRangeScreen,
}

/// Compute I chart limits for observations already in display order.
///
/// # Examples
///
/// ```
/// use shewhart::spc::{individuals_limits, ScreeningConstants};
///
/// let values = [25.0, 25.2, 24.8, 25.1, 24.9, 25.3, 25.0, 24.7];
/// let result = individuals_limits(&values, &ScreeningConstants::default())
///     .expect("two or more observations");
/// assert!(result.limits.ucl > result.limits.cl);
/// assert!(result.limits.cl > result.limits.lcl);
/// ```
///
/// # Errors
///
/// `Division` for fewer than two observations or non-finite values.
pub fn individuals_limits(
    values: &[f64],
    constants: &ScreeningConstants,
) -> Result<IndividualsLimits> {
    let screen = screen_moving_ranges(values, constants.d4)?;
    let x_bar = stats::mean(values)
        .ok_or_else(|| ShewhartError::division("observations contain non-finite values"))?;

    Ok(IndividualsLimits {
        limits: ControlLimits::symmetric(x_bar, constants.e2 * screen.mr_bar),
        screen,
    })
}

/// I chart over one focal column of a table.
#[derive(Debug, Clone)]
pub struct IndividualsChart {
    values: Vec<f64>,
}

impl IndividualsChart {
    /// Extract the focal column.
    pub fn from_table(table: &Table, value_column: &str) -> Result<Self> {
        Ok(Self {
            values: table.numeric_column(value_column)?,
        })
    }

    /// Build directly from values (row `i` is `values[i]`).
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }
}

impl GroupLimits for IndividualsChart {
    fn kind(&self) -> ChartKind {
        ChartKind::I
    }

    fn group_limits(
        &self,
        rows: &[usize],
        constants: &ScreeningConstants,
    ) -> Result<Vec<LimitSet>> {
        let values: Vec<f64> = rows.iter().map(|&r| self.values[r]).collect();
        let result = individuals_limits(&values, constants)?;

        tracing::debug!(
            rows = rows.len(),
            center = result.limits.cl,
            mr_bar = result.screen.mr_bar,
            excluded = result.screen.excluded(),
            "individuals limits"
        );

        Ok(values
            .into_iter()
            .map(|value| LimitSet {
                value,
                limits: result.limits,
                prime: None,
            })
            .collect())
    }
}
