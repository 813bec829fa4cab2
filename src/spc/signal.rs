//! Reading special-cause weights back out of a computed table.
//!
//! Chart front ends color each point by its weight: common-cause points one
//! way, special causes by direction and by severity relative to the most
//! extreme point on the chart. This module produces that classification as
//! data so every front end agrees on it.

use super::chart::{SC_WEIGHT, SC_WEIGHT_PRIME};
use crate::error::{Result, ShewhartError};
use crate::table::Table;

/// Which pair of limits to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LimitVariant {
    /// `sc_weight`.
    #[default]
    Standard,
    /// `sc_weight_prime` (P and U charts only).
    Prime,
}

impl LimitVariant {
    fn column(self) -> &'static str {
        match self {
            LimitVariant::Standard => SC_WEIGHT,
            LimitVariant::Prime => SC_WEIGHT_PRIME,
        }
    }
}

/// Which side of the center line is desirable for the measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    /// Neither direction is better; every special cause is a concern.
    #[default]
    Neutral,
    /// Points below the lower limit are improvements.
    LowerIsBetter,
    /// Points above the upper limit are improvements.
    HigherIsBetter,
}

/// Position of a point relative to its limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Below,
    Within,
    Above,
}

/// Classification of one output row.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    /// Row index in the computed table.
    pub row: usize,
    /// The special-cause weight that was read.
    pub weight: f64,
    /// Side of the limits.
    pub direction: Direction,
    /// `Some(true)` for a special cause in the desirable direction,
    /// `Some(false)` for one in the undesirable direction, `None` for
    /// common-cause points. Under `Polarity::Neutral` every special cause
    /// is `Some(false)`.
    pub favorable: Option<bool>,
    /// |weight| / max |weight| over the table, in `[0, 1]`.
    pub severity: f64,
}

impl Signal {
    /// Whether the point is outside its limits.
    pub fn is_special_cause(&self) -> bool {
        self.direction != Direction::Within
    }
}

fn weights(table: &Table, variant: LimitVariant) -> Result<Vec<f64>> {
    let column = variant.column();
    if table.column_index(column).is_none() {
        return Err(match variant {
            LimitVariant::Prime => ShewhartError::configuration(
                "no sc_weight_prime column; I charts have no prime limits",
            ),
            LimitVariant::Standard => ShewhartError::schema(format!("column '{column}' not found")),
        });
    }
    table.numeric_column(column)
}

/// Classify every row of a computed chart table.
pub fn classify_signals(
    table: &Table,
    variant: LimitVariant,
    polarity: Polarity,
) -> Result<Vec<Signal>> {
    let weights = weights(table, variant)?;
    let max_abs = weights.iter().fold(0.0_f64, |m, w| m.max(w.abs()));

    Ok(weights
        .into_iter()
        .enumerate()
        .map(|(row, weight)| {
            let direction = if weight < 0.0 {
                Direction::Below
            } else if weight > 0.0 {
                Direction::Above
            } else {
                Direction::Within
            };
            let favorable = match (direction, polarity) {
                (Direction::Within, _) => None,
                (_, Polarity::Neutral) => Some(false),
                (Direction::Below, Polarity::LowerIsBetter) => Some(true),
                (Direction::Above, Polarity::HigherIsBetter) => Some(true),
                _ => Some(false),
            };
            let severity = if max_abs > 0.0 {
                weight.abs() / max_abs
            } else {
                0.0
            };
            Signal {
                row,
                weight,
                direction,
                favorable,
                severity,
            }
        })
        .collect())
}

/// Rows whose weight is non-zero, in table order.
pub fn special_cause_rows(table: &Table, variant: LimitVariant) -> Result<Vec<usize>> {
    Ok(weights(table, variant)?
        .into_iter()
        .enumerate()
        .filter(|&(_, w)| w != 0.0)
        .map(|(i, _)| i)
        .collect())
}
