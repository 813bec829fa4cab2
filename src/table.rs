//! Row-major observation tables.
//!
//! A [`Table`] is the engine's only input and output shape: ordered column
//! names plus rows of [`Value`] cells. Columns the engine does not read pass
//! through untouched.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShewhartError};

/// A single table cell.
///
/// `Value` carries a total order so it can serve as both an ordering key and
/// a stratum key: `Null < Bool < numeric < Text`. `Int` and `Float` compare
/// exactly with each other, so an `Int` beyond 2^53 never equals a nearby
/// `Float`. Float ties use [`f64::total_cmp`] with both zeros equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::Text(_) => 3,
        }
    }

    /// Numeric view of the cell, if it holds an integer or a float.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int(i) => Some(i as f64),
            Value::Float(f) => Some(f),
            _ => None,
        }
    }

}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => float_key(*a).total_cmp(&float_key(*b)),
            (Value::Int(i), Value::Float(f)) => cmp_int_float(*i, *f),
            (Value::Float(f), Value::Int(i)) => cmp_int_float(*i, *f).reverse(),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

/// `-0.0` and `0.0` are the same key, since both equal `Int(0)`.
fn float_key(f: f64) -> f64 {
    if f == 0.0 {
        0.0
    } else {
        f
    }
}

/// Exact comparison of an integer with a float, without rounding the
/// integer through `f64`. NaN sorts by sign as in [`f64::total_cmp`].
fn cmp_int_float(i: i64, f: f64) -> Ordering {
    // 2^63 is exactly representable; every i64 lies in [-2^63, 2^63).
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() {
        return if f.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if f >= TWO_POW_63 {
        return Ordering::Less;
    }
    if f < -TWO_POW_63 {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.total_cmp(&(f - whole)),
        other => other,
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// An ordered sequence of rows sharing one set of column names.
///
/// # Invariants
///
/// - Every row has exactly `columns().len()` cells.
/// - Column names are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given column names.
    ///
    /// Fails with a schema error on duplicate names.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Result<Self> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                return Err(ShewhartError::schema(format!(
                    "duplicate column name '{name}'"
                )));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Append a row. Its width must match the column count.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ShewhartError::schema(format!(
                "row {} has {} cells, expected {}",
                self.rows.len(),
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows in order.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, or `None` if absent.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Position of a column, failing with a schema error if absent.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| ShewhartError::schema(format!("column '{name}' not found")))
    }

    /// Cell at `(row, column name)`, or `None` if either is out of range.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[col])
    }

    /// Extract a column as finite `f64`s.
    ///
    /// Text or boolean cells are a schema error. Null and non-finite cells
    /// are a division error, since any group arithmetic over them would be
    /// undefined.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        let col = self.require_column(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| match (&row[col], row[col].as_f64()) {
                (_, Some(v)) if v.is_finite() => Ok(v),
                (_, Some(v)) => Err(ShewhartError::division(format!(
                    "column '{name}' row {i} is non-finite ({v})"
                ))),
                (Value::Null, None) => Err(ShewhartError::division(format!(
                    "column '{name}' row {i} is missing"
                ))),
                (other, None) => Err(ShewhartError::schema(format!(
                    "column '{name}' row {i} is not numeric ({other:?})"
                ))),
            })
            .collect()
    }

    /// Build a new table with `extra` columns appended and rows taken from
    /// `order` (indices into `self`), each extended with the matching row of
    /// `extra_values`.
    pub(crate) fn reordered_with_columns(
        &self,
        order: &[usize],
        extra: &[&str],
        extra_values: Vec<Vec<f64>>,
    ) -> Table {
        let mut columns = self.columns.clone();
        columns.extend(extra.iter().map(|s| s.to_string()));

        let rows = order
            .iter()
            .zip(extra_values)
            .map(|(&src, computed)| {
                let mut row = self.rows[src].clone();
                row.extend(computed.into_iter().map(Value::Float));
                row
            })
            .collect();

        Table { columns, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut t = Table::new(["month", "site", "count"]).expect("unique columns");
        t.push_row(vec!["2024-01".into(), "north".into(), Value::Int(10)])
            .expect("width matches");
        t.push_row(vec!["2024-02".into(), "south".into(), Value::Float(12.5)])
            .expect("width matches");
        t
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let err = Table::new(["a", "b", "a"]).unwrap_err();
        assert!(matches!(err, ShewhartError::Schema(_)));
    }

    #[test]
    fn test_push_row_width_checked() {
        let mut t = Table::new(["a", "b"]).unwrap();
        assert!(t.push_row(vec![Value::Int(1)]).is_err());
        assert!(t.is_empty());
    }

    #[test]
    fn test_numeric_column() {
        let t = sample();
        let counts = t.numeric_column("count").unwrap();
        assert_eq!(counts, vec![10.0, 12.5]);
    }

    #[test]
    fn test_numeric_column_missing_is_schema_error() {
        let err = sample().numeric_column("visits").unwrap_err();
        assert!(matches!(err, ShewhartError::Schema(_)));
    }

    #[test]
    fn test_numeric_column_text_is_schema_error() {
        let err = sample().numeric_column("site").unwrap_err();
        assert!(matches!(err, ShewhartError::Schema(_)));
    }

    #[test]
    fn test_numeric_column_nan_is_division_error() {
        let mut t = Table::new(["x"]).unwrap();
        t.push_row(vec![Value::Float(f64::NAN)]).unwrap();
        assert!(matches!(
            t.numeric_column("x").unwrap_err(),
            ShewhartError::Division(_)
        ));

        let mut t = Table::new(["x"]).unwrap();
        t.push_row(vec![Value::Null]).unwrap();
        assert!(matches!(
            t.numeric_column("x").unwrap_err(),
            ShewhartError::Division(_)
        ));
    }

    #[test]
    fn test_value_order_mixes_int_and_float() {
        assert!(Value::Int(2) < Value::Float(2.5));
        assert!(Value::Float(1.5) < Value::Int(2));
        assert_eq!(Value::Int(3), Value::Float(3.0));
    }

    #[test]
    fn test_value_order_is_exact_beyond_f64_precision() {
        let a = Value::Int(9_007_199_254_740_993);
        let b = Value::Float(9_007_199_254_740_992.0);
        let c = Value::Int(9_007_199_254_740_992);
        assert!(a > b);
        assert_eq!(b, c);
        assert!(a > c);

        let two_pow_63 = 9_223_372_036_854_775_808.0;
        assert!(Value::Int(i64::MAX) < Value::Float(two_pow_63));
        assert_eq!(Value::Int(i64::MIN), Value::Float(-two_pow_63));
        assert!(Value::Int(-1) < Value::Float(-0.5));
        assert!(Value::Float(0.5) > Value::Int(0));
    }

    #[test]
    fn test_value_order_special_floats() {
        assert_eq!(Value::Float(-0.0), Value::Float(0.0));
        assert_eq!(Value::Int(0), Value::Float(-0.0));
        assert!(Value::Int(i64::MAX) < Value::Float(f64::INFINITY));
        assert!(Value::Int(i64::MIN) > Value::Float(f64::NEG_INFINITY));
        assert!(Value::Int(i64::MAX) < Value::Float(f64::NAN));
        assert!(Value::Float(f64::INFINITY) < Value::Float(f64::NAN));
    }

    #[test]
    fn test_large_ints_form_distinct_strata_keys() {
        use std::collections::BTreeMap;

        let mut groups: BTreeMap<Value, usize> = BTreeMap::new();
        for v in [
            Value::Int(9_007_199_254_740_993),
            Value::Float(9_007_199_254_740_992.0),
            Value::Int(9_007_199_254_740_992),
        ] {
            *groups.entry(v).or_default() += 1;
        }
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&Value::Int(9_007_199_254_740_992)], 2);
    }

    #[test]
    fn test_value_order_across_kinds() {
        let mut vals = vec![
            Value::Text("b".into()),
            Value::Int(1),
            Value::Null,
            Value::Bool(true),
            Value::Text("a".into()),
        ];
        vals.sort();
        assert_eq!(
            vals,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Int(1),
                Value::Text("a".into()),
                Value::Text("b".into()),
            ]
        );
    }

    #[test]
    fn test_value_lookup() {
        let t = sample();
        assert_eq!(t.value(1, "site"), Some(&Value::Text("south".into())));
        assert_eq!(t.value(5, "site"), None);
        assert_eq!(t.value(0, "missing"), None);
    }

    #[test]
    fn test_reordered_with_columns() {
        let t = sample();
        let out = t.reordered_with_columns(&[1, 0], &["center"], vec![vec![1.0], vec![2.0]]);
        assert_eq!(out.columns(), &["month", "site", "count", "center"]);
        assert_eq!(out.value(0, "month"), Some(&Value::Text("2024-02".into())));
        assert_eq!(out.value(0, "center"), Some(&Value::Float(1.0)));
        assert_eq!(out.value(1, "center"), Some(&Value::Float(2.0)));
        // Source untouched.
        assert_eq!(t.columns().len(), 3);
    }

    #[test]
    fn test_value_json_roundtrip_shapes() {
        let vals: Vec<Value> = serde_json::from_str(r#"[null, true, 3, 2.5, "x"]"#).unwrap();
        assert_eq!(
            vals,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Int(3),
                Value::Float(2.5),
                Value::Text("x".into()),
            ]
        );
    }
}
