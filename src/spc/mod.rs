//! Shewhart control limits over stratified tables.
//!
//! Computes center lines, control limits, and special-cause weights for
//! three observation models, independently per stratum.
//!
//! # Charts
//!
//! - [`i_chart_limits`] — Individuals chart on a focal numeric column
//! - [`p_chart_limits`] — Proportions with varying sample size (binomial)
//! - [`u_chart_limits`] — Rates per unit of varying exposure (Poisson)
//!
//! P and U charts also carry *prime* limits, widened or narrowed by the
//! screened moving range of the standardized residuals to account for
//! over- or under-dispersion.
//!
//! # Pipeline
//!
//! 1. [`stratify`] splits the table into groups by key columns.
//! 2. Each group is stable-sorted by the ordering column.
//! 3. [`screen_moving_ranges`] estimates short-term dispersion.
//! 4. The model's [`GroupLimits`] implementation sets the limits.
//! 5. [`special_cause_weight`] scores each row.
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.
//! - Provost, L.P. & Murray, S.K. (2011). *The Health Care Data Guide*.
//! - Laney, D.B. (2002). "Improved Control Charts for Attributes",
//!   *Quality Engineering* 14(4), pp. 531-537.

mod attributes;
mod chart;
mod engine;
mod moving_range;
mod scoring;
mod signal;
mod stratify;
mod variables;

pub use attributes::{
    attribute_limits, AttributeChart, AttributeChartPoint, AttributeLimits, CountModel,
};
pub use chart::{
    ChartKind, ControlLimits, GroupLimits, LimitSet, CENTER, LCL, LCL_PRIME, SC_WEIGHT,
    SC_WEIGHT_PRIME, UCL, UCL_PRIME,
};
pub use engine::{
    compute, i_chart_limits, p_chart_limits, u_chart_limits, ChartConfig, ChartModel,
};
pub use moving_range::{
    moving_ranges, screen_moving_ranges, MovingRangeScreen, ScreeningConstants, D2, D4_SCREEN, E2,
};
pub use scoring::special_cause_weight;
pub use signal::{classify_signals, special_cause_rows, Direction, LimitVariant, Polarity, Signal};
pub use stratify::{stratify, Strata, Stratification, StratumKey};
pub use variables::{individuals_limits, IndividualsChart, IndividualsLimits};
