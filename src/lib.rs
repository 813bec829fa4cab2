//! # shewhart
//!
//! Shewhart control limits for individual values (I), proportions (P), and
//! rates (U) over tabular data, optionally stratified into independent
//! groups.
//!
//! The engine takes a plain [`table::Table`] and returns a new table with
//! the input columns plus center line, control limits, and signed
//! special-cause weights for every row. P and U charts additionally carry
//! overdispersion-adjusted *prime* limits.
//!
//! ## Modules
//!
//! - [`spc`] — Chart models, moving-range screening, limits, and scoring
//! - [`table`] — Row-major observation tables and cell values
//! - [`error`] — Error taxonomy (configuration, division, schema)
//! - [`io`] — CSV reading and writing (feature `csv`)
//!
//! ## Example
//!
//! ```
//! use shewhart::spc::{p_chart_limits, Stratification};
//! use shewhart::table::{Table, Value};
//!
//! let mut table = Table::new(["month", "rejects", "claims"]).unwrap();
//! for (m, x, n) in [(1, 12, 200), (2, 15, 210), (3, 11, 190), (4, 14, 205)] {
//!     table
//!         .push_row(vec![Value::Int(m), Value::Int(x), Value::Int(n)])
//!         .unwrap();
//! }
//!
//! let chart = p_chart_limits(&table, "rejects", "claims", "month", &Stratification::Pooled)
//!     .expect("valid input");
//! assert_eq!(chart.value(0, "center"), Some(&Value::Float(52.0 / 805.0)));
//! ```
//!
//! ## Design Philosophy
//!
//! - **Pure transform**: no state survives a call; the input is never modified
//! - **Fail fast**: configuration and schema errors are reported before any
//!   arithmetic, and undefined arithmetic is an error rather than NaN
//! - **Numerical stability**: means and pooled counts via `u-numflow`'s
//!   compensated summation

pub mod error;
#[cfg(feature = "csv")]
pub mod io;
pub mod spc;
pub mod table;

pub use error::{Result, ShewhartError};
