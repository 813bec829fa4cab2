//! Core control chart types and trait.
//!
//! Defines the building blocks shared by all chart models: control limits,
//! the per-row limit set merged back onto the table, the model identifiers,
//! and the [`GroupLimits`] trait every model implements.
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.
//! - Provost, L.P. & Murray, S.K. (2011). *The Health Care Data Guide*.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::moving_range::ScreeningConstants;
use crate::error::{Result, ShewhartError};

/// Control limits for one row or one group.
///
/// # Invariants
///
/// - `lcl <= cl <= ucl`
/// - All values are finite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlLimits {
    /// Upper control limit.
    pub ucl: f64,
    /// Center line.
    pub cl: f64,
    /// Lower control limit.
    pub lcl: f64,
}

impl ControlLimits {
    /// Symmetric limits `cl ± half_width`.
    pub fn symmetric(cl: f64, half_width: f64) -> Self {
        Self {
            ucl: cl + half_width,
            cl,
            lcl: cl - half_width,
        }
    }

    /// Whether `value` lies within `[lcl, ucl]`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lcl && value <= self.ucl
    }
}

/// Limits computed for a single row, in the row's group context.
///
/// `prime` is present only for models with overdispersion-adjusted limits
/// (P and U); it shares `limits.cl`.
#[derive(Debug, Clone, PartialEq)]
pub struct LimitSet {
    /// The plotted statistic (focal value, proportion or rate).
    pub value: f64,
    /// Standard limits.
    pub limits: ControlLimits,
    /// Prime limits.
    pub prime: Option<ControlLimits>,
}

/// Chart model identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartKind {
    /// Individual values.
    I,
    /// Proportions (binomial).
    P,
    /// Rates per unit of exposure (Poisson).
    U,
}

impl ChartKind {
    /// Computed columns appended to the output table, in order.
    pub fn output_columns(self) -> &'static [&'static str] {
        match self {
            ChartKind::I => &[CENTER, LCL, UCL, SC_WEIGHT],
            ChartKind::P | ChartKind::U => &[
                CENTER,
                LCL,
                UCL,
                SC_WEIGHT,
                LCL_PRIME,
                UCL_PRIME,
                SC_WEIGHT_PRIME,
            ],
        }
    }

    /// Whether this model produces prime limits.
    pub fn has_prime(self) -> bool {
        !matches!(self, ChartKind::I)
    }
}

impl FromStr for ChartKind {
    type Err = ShewhartError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "I" => Ok(ChartKind::I),
            "P" => Ok(ChartKind::P),
            "U" => Ok(ChartKind::U),
            other => Err(ShewhartError::configuration(format!(
                "unrecognized chart model '{other}'; expected one of I, P, U"
            ))),
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChartKind::I => "I",
            ChartKind::P => "P",
            ChartKind::U => "U",
        };
        f.write_str(s)
    }
}

/// Output column: center line.
pub const CENTER: &str = "center";
/// Output column: lower control limit.
pub const LCL: &str = "lcl";
/// Output column: upper control limit.
pub const UCL: &str = "ucl";
/// Output column: special-cause weight against the standard limits.
pub const SC_WEIGHT: &str = "sc_weight";
/// Output column: prime lower control limit.
pub const LCL_PRIME: &str = "lcl_prime";
/// Output column: prime upper control limit.
pub const UCL_PRIME: &str = "ucl_prime";
/// Output column: special-cause weight against the prime limits.
pub const SC_WEIGHT_PRIME: &str = "sc_weight_prime";

/// Per-group limit computation for one chart model.
///
/// Implementors hold the model's numeric columns, extracted once from the
/// table. `rows` are indices into those columns, already sorted by the
/// ordering column; the returned sets are aligned with `rows`.
pub trait GroupLimits {
    /// Which model this is.
    fn kind(&self) -> ChartKind;

    /// Compute limits for one group.
    fn group_limits(&self, rows: &[usize], constants: &ScreeningConstants)
        -> Result<Vec<LimitSet>>;
}
