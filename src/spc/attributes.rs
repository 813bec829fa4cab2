//! Attributes chart limits: P (proportions) and U (rates).
//!
//! Both charts pool the group's counts into one center line and give every
//! row its own limits, since the row's denominator sets its sampling error.
//!
//! # Formulas
//!
//! | Chart | Center | sigma_i |
//! |-------|--------|---------|
//! | P     | p-bar = sum(x) / sum(n) | sqrt(p-bar (1 - p-bar) / n_i) |
//! | U     | u-bar = sum(x) / sum(n) | sqrt(u-bar / n_i) |
//!
//! - Standard limits: CL ± 3 * sigma_i
//! - Prime limits: CL ± 3 * sigma_i * m, where m = MR-bar(z) / d2 and
//!   z_i = (v_i - CL) / sigma_i, screened as in [`screen_moving_ranges`]
//!
//! Lower limits are not clamped at zero.
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.,
//!   Chapter 7: Control Charts for Attributes.
//! - Laney, D.B. (2002). "Improved Control Charts for Attributes",
//!   *Quality Engineering* 14(4), pp. 531-537.
//! - Provost, L.P. & Murray, S.K. (2011). *The Health Care Data Guide*, Chapter 8.

use u_numflow::stats;

use super::chart::{ChartKind, ControlLimits, GroupLimits, LimitSet};
use super::moving_range::{screen_moving_ranges, MovingRangeScreen, ScreeningConstants};
use crate::error::{Result, ShewhartError};
use crate::table::Table;

/// Sampling model behind an attributes chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountModel {
    /// Proportion of items with an attribute (P chart).
    Binomial,
    /// Events per unit of exposure (U chart).
    Poisson,
}

impl CountModel {
    /// Standard deviation of one row's statistic around the pooled center.
    fn sigma(self, center: f64, denominator: f64) -> f64 {
        match self {
            CountModel::Binomial => (center * (1.0 - center) / denominator).sqrt(),
            CountModel::Poisson => (center / denominator).sqrt(),
        }
    }

    fn kind(self) -> ChartKind {
        match self {
            CountModel::Binomial => ChartKind::P,
            CountModel::Poisson => ChartKind::U,
        }
    }
}

/// A single row of an attributes chart.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeChartPoint {
    /// The zero-based position of this point within its group.
    pub index: usize,
    /// numerator / denominator.
    pub value: f64,
    /// Row standard deviation under the count model.
    pub sigma: f64,
    /// Standardized residual (value - center) / sigma.
    pub z: f64,
    /// Standard limits.
    pub limits: ControlLimits,
    /// Overdispersion-adjusted limits.
    pub prime: ControlLimits,
}

/// Limits for one group of an attributes chart.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeLimits {
    /// Pooled center line.
    pub center: f64,
    /// Screened moving range of the z-values.
    pub screen: MovingRangeScreen,
    /// Sigma multiplier applied to the prime limits, MR-bar(z) / d2.
    pub overdispersion: f64,
    /// Per-row results in input order.
    pub points: Vec<AttributeChartPoint>,
}

/// Compute P or U chart limits for rows already in display order.
///
/// # Errors
///
/// - `Division` if a denominator is not positive, if the pooled center
///   leaves a zero standard deviation (p-bar of 0 or 1, u-bar of 0), or if
///   there are fewer than two rows.
pub fn attribute_limits(
    model: CountModel,
    numerators: &[f64],
    denominators: &[f64],
    constants: &ScreeningConstants,
) -> Result<AttributeLimits> {
    if numerators.len() != denominators.len() {
        return Err(ShewhartError::schema(format!(
            "{} numerators but {} denominators",
            numerators.len(),
            denominators.len()
        )));
    }
    if let Some((i, d)) = denominators.iter().enumerate().find(|&(_, &d)| d <= 0.0) {
        return Err(ShewhartError::division(format!(
            "denominator at position {i} is {d}; denominators must be > 0"
        )));
    }
    if numerators.len() < 2 {
        return Err(ShewhartError::division(format!(
            "moving range needs at least 2 observations, got {}",
            numerators.len()
        )));
    }

    let total = stats::kahan_sum(numerators);
    let exposure = stats::kahan_sum(denominators);
    let center = total / exposure;

    let mut sigmas = Vec::with_capacity(numerators.len());
    let mut values = Vec::with_capacity(numerators.len());
    let mut z = Vec::with_capacity(numerators.len());
    for (&x, &n) in numerators.iter().zip(denominators) {
        let sigma = model.sigma(center, n);
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(ShewhartError::division(format!(
                "center {center} gives zero or undefined standard deviation"
            )));
        }
        let v = x / n;
        sigmas.push(sigma);
        values.push(v);
        z.push((v - center) / sigma);
    }

    let screen = screen_moving_ranges(&z, constants.d4)?;
    let overdispersion = screen.mr_bar / constants.d2;

    let points = values
        .iter()
        .zip(&sigmas)
        .zip(&z)
        .enumerate()
        .map(|(index, ((&value, &sigma), &z))| AttributeChartPoint {
            index,
            value,
            sigma,
            z,
            limits: ControlLimits::symmetric(center, constants.sigma * sigma),
            prime: ControlLimits::symmetric(center, constants.sigma * sigma * overdispersion),
        })
        .collect();

    Ok(AttributeLimits {
        center,
        screen,
        overdispersion,
        points,
    })
}

/// P or U chart over numerator and denominator columns of a table.
#[derive(Debug, Clone)]
pub struct AttributeChart {
    model: CountModel,
    numerators: Vec<f64>,
    denominators: Vec<f64>,
}

impl AttributeChart {
    /// Extract both count columns.
    pub fn from_table(
        table: &Table,
        model: CountModel,
        numerator: &str,
        denominator: &str,
    ) -> Result<Self> {
        Ok(Self {
            model,
            numerators: table.numeric_column(numerator)?,
            denominators: table.numeric_column(denominator)?,
        })
    }

    /// Build directly from aligned columns.
    pub fn from_counts(model: CountModel, numerators: Vec<f64>, denominators: Vec<f64>) -> Self {
        Self {
            model,
            numerators,
            denominators,
        }
    }
}

impl GroupLimits for AttributeChart {
    fn kind(&self) -> ChartKind {
        self.model.kind()
    }

    fn group_limits(
        &self,
        rows: &[usize],
        constants: &ScreeningConstants,
    ) -> Result<Vec<LimitSet>> {
        let numerators: Vec<f64> = rows.iter().map(|&r| self.numerators[r]).collect();
        let denominators: Vec<f64> = rows.iter().map(|&r| self.denominators[r]).collect();
        let result = attribute_limits(self.model, &numerators, &denominators, constants)?;

        tracing::debug!(
            chart = %self.model.kind(),
            rows = rows.len(),
            center = result.center,
            mr_bar = result.screen.mr_bar,
            overdispersion = result.overdispersion,
            "attribute limits"
        );

        Ok(result
            .points
            .into_iter()
            .map(|p| LimitSet {
                value: p.value,
                limits: p.limits,
                prime: Some(p.prime),
            })
            .collect())
    }
}
