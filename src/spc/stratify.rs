//! Partitioning of an observation table into independent strata.
//!
//! Groups are stored as an ordered map from the tuple of stratum key values
//! to the row indices (into the source table) that share that key. No rows
//! are copied; every downstream stage works through these indices.

use std::collections::BTreeMap;

use crate::error::{Result, ShewhartError};
use crate::table::{Table, Value};

/// Tuple of stratum column values identifying one group.
///
/// Empty for the single implicit group of an unstratified table.
pub type StratumKey = Vec<Value>;

/// How a table is split into groups.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Stratification {
    /// The whole table is one group.
    #[default]
    Pooled,
    /// One group per distinct tuple of values in these columns.
    By(Vec<String>),
}

impl Stratification {
    /// Build from the flag-plus-list form used by the chart operations.
    ///
    /// A set flag with an empty list is a configuration error. The list is
    /// ignored when the flag is not set.
    pub fn from_flag(enabled: bool, columns: &[String]) -> Result<Self> {
        if !enabled {
            return Ok(Self::Pooled);
        }
        if columns.is_empty() {
            return Err(ShewhartError::configuration(
                "stratification requested with an empty strata list; expected at least one column",
            ));
        }
        Ok(Self::By(columns.to_vec()))
    }

    /// Stratum column names (empty when pooled).
    pub fn columns(&self) -> &[String] {
        match self {
            Self::Pooled => &[],
            Self::By(cols) => cols,
        }
    }

    /// Check the variant is usable before any table is touched.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::By(cols) if cols.is_empty() => Err(ShewhartError::configuration(
                "stratification requested with an empty strata list; expected at least one column",
            )),
            _ => Ok(()),
        }
    }
}

/// Disjoint groups of row indices covering every row of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Strata {
    groups: BTreeMap<StratumKey, Vec<usize>>,
}

impl Strata {
    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if there are no groups (empty table).
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&StratumKey, &[usize])> {
        self.groups.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Row indices for one key.
    pub fn get(&self, key: &[Value]) -> Option<&[usize]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    /// Stable-sort each group's rows ascending by the values in `column`.
    ///
    /// Ties keep their original table order.
    pub fn sort_by_column(&mut self, table: &Table, column: usize) {
        let rows = table.rows();
        for indices in self.groups.values_mut() {
            indices.sort_by(|&a, &b| rows[a][column].cmp(&rows[b][column]));
        }
    }

    /// Consume into `(key, rows)` pairs in ascending key order.
    pub fn into_groups(self) -> Vec<(StratumKey, Vec<usize>)> {
        self.groups.into_iter().collect()
    }
}

/// Partition `table` according to `by`.
///
/// Row order inside each group is the table's original order.
pub fn stratify(table: &Table, by: &Stratification) -> Result<Strata> {
    by.validate()?;
    let key_columns = by
        .columns()
        .iter()
        .map(|name| table.require_column(name))
        .collect::<Result<Vec<_>>>()?;

    let mut groups: BTreeMap<StratumKey, Vec<usize>> = BTreeMap::new();
    for (i, row) in table.rows().iter().enumerate() {
        let key: StratumKey = key_columns.iter().map(|&c| row[c].clone()).collect();
        groups.entry(key).or_default().push(i);
    }

    Ok(Strata { groups })
}

/// Render a key for log and error messages.
pub(crate) fn describe_key(key: &[Value]) -> String {
    if key.is_empty() {
        return "(all rows)".to_string();
    }
    let parts: Vec<String> = key.iter().map(|v| format!("{v}")).collect();
    format!("[{}]", parts.join(", "))
}
