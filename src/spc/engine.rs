//! Table-level chart computation.
//!
//! [`compute`] is the single entry point: it validates the configuration
//! against the table, splits the table into strata, orders each stratum,
//! computes limits per group through the model's [`GroupLimits`]
//! implementation, scores every row, and returns a new table holding the
//! input columns plus the model's computed columns.
//!
//! Configuration and schema problems are reported before any arithmetic
//! runs; arithmetic problems abort the whole call. The input table is never
//! modified.

use serde::{Deserialize, Serialize};

use super::attributes::{AttributeChart, CountModel};
use super::chart::{ChartKind, GroupLimits, LimitSet};
use super::moving_range::ScreeningConstants;
use super::scoring::special_cause_weight;
use super::stratify::{describe_key, stratify, Stratification, StratumKey};
use super::variables::IndividualsChart;
use crate::error::{Result, ShewhartError};
use crate::table::Table;

/// Chart model with its value columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "chart")]
pub enum ChartModel {
    /// I chart over one focal column.
    #[serde(rename = "I")]
    Individuals {
        /// Focal numeric column.
        value: String,
    },
    /// P chart over count columns.
    #[serde(rename = "P")]
    Proportion {
        /// Items with the attribute.
        numerator: String,
        /// Items inspected.
        denominator: String,
    },
    /// U chart over event and exposure columns.
    #[serde(rename = "U")]
    Rate {
        /// Event count.
        numerator: String,
        /// Exposure.
        denominator: String,
    },
}

impl ChartModel {
    /// Build a model from an identifier string and its value columns.
    ///
    /// `I` takes one column; `P` and `U` take numerator then denominator.
    pub fn from_parts(kind: &str, columns: &[&str]) -> Result<Self> {
        let kind: ChartKind = kind.parse()?;
        match (kind, columns) {
            (ChartKind::I, [value]) => Ok(Self::Individuals {
                value: value.to_string(),
            }),
            (ChartKind::P, [numerator, denominator]) => Ok(Self::Proportion {
                numerator: numerator.to_string(),
                denominator: denominator.to_string(),
            }),
            (ChartKind::U, [numerator, denominator]) => Ok(Self::Rate {
                numerator: numerator.to_string(),
                denominator: denominator.to_string(),
            }),
            (kind, cols) => Err(ShewhartError::configuration(format!(
                "{kind} chart given {} value column(s)",
                cols.len()
            ))),
        }
    }

    /// Model identifier.
    pub fn kind(&self) -> ChartKind {
        match self {
            Self::Individuals { .. } => ChartKind::I,
            Self::Proportion { .. } => ChartKind::P,
            Self::Rate { .. } => ChartKind::U,
        }
    }

    /// Columns the model reads values from.
    pub fn value_columns(&self) -> Vec<&str> {
        match self {
            Self::Individuals { value } => vec![value.as_str()],
            Self::Proportion {
                numerator,
                denominator,
            }
            | Self::Rate {
                numerator,
                denominator,
            } => vec![numerator.as_str(), denominator.as_str()],
        }
    }

    fn calculator(&self, table: &Table) -> Result<Box<dyn GroupLimits + Send + Sync>> {
        Ok(match self {
            Self::Individuals { value } => Box::new(IndividualsChart::from_table(table, value)?),
            Self::Proportion {
                numerator,
                denominator,
            } => Box::new(AttributeChart::from_table(
                table,
                CountModel::Binomial,
                numerator,
                denominator,
            )?),
            Self::Rate {
                numerator,
                denominator,
            } => Box::new(AttributeChart::from_table(
                table,
                CountModel::Poisson,
                numerator,
                denominator,
            )?),
        })
    }
}

/// Everything [`compute`] needs besides the table.
///
/// Deserializes from JSON such as
///
/// ```json
/// {
///   "model": { "chart": "P", "numerator": "rejects", "denominator": "claims" },
///   "order_by": "month",
///   "strata": ["clinic"]
/// }
/// ```
///
/// `strata` absent means one pooled group; present but empty is a
/// configuration error. `constants` defaults to the standard span-2 values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Model and value columns.
    pub model: ChartModel,
    /// Column defining moving-range adjacency and display order.
    pub order_by: String,
    /// Stratum columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strata: Option<Vec<String>>,
    /// Chart constants.
    #[serde(default)]
    pub constants: ScreeningConstants,
}

impl ChartConfig {
    /// Unstratified configuration with default constants.
    pub fn new(model: ChartModel, order_by: impl Into<String>) -> Self {
        Self {
            model,
            order_by: order_by.into(),
            strata: None,
            constants: ScreeningConstants::default(),
        }
    }

    /// Compute independent limits per distinct value tuple of `columns`.
    pub fn stratified_by<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.strata = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the chart constants.
    pub fn with_constants(mut self, constants: ScreeningConstants) -> Self {
        self.constants = constants;
        self
    }

    /// Parse from JSON. Unknown chart identifiers and malformed fields are
    /// configuration errors.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ShewhartError::configuration(format!("invalid chart config: {e}")))
    }

    /// Grouping implied by `strata`.
    pub fn stratification(&self) -> Result<Stratification> {
        match &self.strata {
            None => Ok(Stratification::Pooled),
            Some(cols) => Stratification::from_flag(true, cols),
        }
    }
}

/// Compute control limits and special-cause weights for `table`.
///
/// Output rows are ordered by stratum key, then by `config.order_by`
/// (stable), and carry the columns listed by [`ChartKind::output_columns`]
/// after the input columns.
///
/// # Errors
///
/// - `Configuration` for invalid constants or an empty strata list.
/// - `Schema` for missing or non-numeric columns, or when the table already
///   holds a computed column name.
/// - `Division` for groups with fewer than two rows, non-positive
///   denominators, degenerate pooled centers, or points outside limits that
///   coincide with the center line.
pub fn compute(table: &Table, config: &ChartConfig) -> Result<Table> {
    config.constants.validate()?;
    let by = config.stratification()?;
    let kind = config.model.kind();

    for name in config.model.value_columns() {
        table.require_column(name)?;
    }
    let order_col = table.require_column(&config.order_by)?;
    for name in by.columns() {
        table.require_column(name)?;
    }
    if let Some(taken) = kind
        .output_columns()
        .iter()
        .find(|c| table.column_index(c).is_some())
    {
        return Err(ShewhartError::schema(format!(
            "input already has a column named '{taken}'"
        )));
    }

    let calculator = config.model.calculator(table)?;

    let mut strata = stratify(table, &by)?;
    if strata.is_empty() {
        return Err(ShewhartError::division("table has no rows"));
    }
    strata.sort_by_column(table, order_col);
    let groups = strata.into_groups();

    let limits = group_limits_all(calculator.as_ref(), &groups, &config.constants)?;

    let mut order = Vec::with_capacity(table.len());
    let mut computed = Vec::with_capacity(table.len());
    for ((key, rows), sets) in groups.iter().zip(limits) {
        for (&row, set) in rows.iter().zip(sets) {
            let cells = score_row(&set, kind)
                .map_err(|e| e.context(format!("group {} row {row}", describe_key(key))))?;
            order.push(row);
            computed.push(cells);
        }
    }

    tracing::debug!(
        chart = %kind,
        rows = order.len(),
        groups = groups.len(),
        "computed control limits"
    );

    Ok(table.reordered_with_columns(&order, kind.output_columns(), computed))
}

fn group_limits_all(
    calculator: &(dyn GroupLimits + Send + Sync),
    groups: &[(StratumKey, Vec<usize>)],
    constants: &ScreeningConstants,
) -> Result<Vec<Vec<LimitSet>>> {
    let run = |(key, rows): &(StratumKey, Vec<usize>)| {
        calculator
            .group_limits(rows, constants)
            .map_err(|e| e.context(format!("group {}", describe_key(key))))
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        groups.par_iter().map(run).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        groups.iter().map(run).collect()
    }
}

/// Computed cells for one row, in `kind.output_columns()` order.
fn score_row(set: &LimitSet, kind: ChartKind) -> Result<Vec<f64>> {
    let l = &set.limits;
    let mut cells = vec![l.cl, l.lcl, l.ucl, special_cause_weight(set.value, l)?];
    if kind.has_prime() {
        let Some(p) = set.prime.as_ref() else {
            return Err(ShewhartError::configuration(format!(
                "{kind} chart without prime limits"
            )));
        };
        cells.extend([p.lcl, p.ucl, special_cause_weight(set.value, p)?]);
    }
    Ok(cells)
}

/// I chart limits: adds `center`, `lcl`, `ucl`, `sc_weight`.
///
/// # Examples
///
/// ```
/// use shewhart::spc::{i_chart_limits, Stratification};
/// use shewhart::table::{Table, Value};
///
/// let mut table = Table::new(["month", "visits"]).unwrap();
/// for (m, v) in [(1, 40.0), (2, 42.0), (3, 41.0), (4, 39.0), (5, 43.0)] {
///     table.push_row(vec![Value::Int(m), Value::Float(v)]).unwrap();
/// }
///
/// let out = i_chart_limits(&table, "visits", "month", &Stratification::Pooled).unwrap();
/// assert_eq!(out.columns().len(), 6);
/// assert_eq!(out.value(0, "center"), Some(&Value::Float(41.0)));
/// ```
pub fn i_chart_limits(
    table: &Table,
    value: &str,
    order_by: &str,
    strata: &Stratification,
) -> Result<Table> {
    let model = ChartModel::Individuals {
        value: value.to_string(),
    };
    let config = with_strata(ChartConfig::new(model, order_by), strata);
    compute(table, &config)
}

/// P chart limits: adds `center`, `lcl`, `ucl`, `sc_weight`, `lcl_prime`,
/// `ucl_prime`, `sc_weight_prime`.
pub fn p_chart_limits(
    table: &Table,
    numerator: &str,
    denominator: &str,
    order_by: &str,
    strata: &Stratification,
) -> Result<Table> {
    let model = ChartModel::Proportion {
        numerator: numerator.to_string(),
        denominator: denominator.to_string(),
    };
    let config = with_strata(ChartConfig::new(model, order_by), strata);
    compute(table, &config)
}

/// U chart limits: same columns as [`p_chart_limits`].
///
/// Rates are per unit of the denominator; rescale the value and limit
/// columns afterwards for per-thousand style reporting, not the inputs.
pub fn u_chart_limits(
    table: &Table,
    numerator: &str,
    denominator: &str,
    order_by: &str,
    strata: &Stratification,
) -> Result<Table> {
    let model = ChartModel::Rate {
        numerator: numerator.to_string(),
        denominator: denominator.to_string(),
    };
    let config = with_strata(ChartConfig::new(model, order_by), strata);
    compute(table, &config)
}

fn with_strata(config: ChartConfig, strata: &Stratification) -> ChartConfig {
    match strata {
        Stratification::Pooled => config,
        Stratification::By(cols) => config.stratified_by(cols.iter().cloned()),
    }
}
