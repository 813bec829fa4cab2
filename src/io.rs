//! CSV reading and writing for [`Table`]s.
//!
//! Cells are typed individually on read: empty → `Null`, then `i64`, `f64`,
//! `true`/`false`, and anything else as text.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use crate::error::{Result, ShewhartError};
use crate::table::{Table, Value};

fn io_error(e: impl std::fmt::Display) -> ShewhartError {
    ShewhartError::Io(e.to_string())
}

/// Read a headered CSV stream into a table.
pub fn read_csv<R: Read>(reader: R) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(io_error)?
        .iter()
        .map(|s| s.to_string())
        .collect();
    let mut table = Table::new(headers)?;

    for result in reader.records() {
        let record = result.map_err(io_error)?;
        table.push_row(record.iter().map(parse_cell).collect())?;
    }

    let (rows, columns) = (table.len(), table.columns().len());
    tracing::debug!(rows, columns, "read csv");
    Ok(table)
}

/// Read a headered CSV file into a table.
pub fn read_csv_path(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| io_error(format!("{}: {e}", path.display())))?;
    read_csv(BufReader::new(file))
}

/// Write a table as headered CSV. Nulls become empty fields.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(table.columns()).map_err(io_error)?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|v| v.to_string()))
            .map_err(io_error)?;
    }
    writer.flush().map_err(io_error)
}

/// Infer a cell's type from its text.
fn parse_cell(s: &str) -> Value {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return Value::Float(f);
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::Text(s.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spc::{p_chart_limits, Stratification};

    const CLAIMS: &str = "\
month,clinic,reject_count,total_count
2024-01,north,12,200
2024-02,north,15,210
2024-03,north,11,190
2024-01,south,5,90
2024-02,south,7,110
2024-03,south,,100
";

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell(""), Value::Null);
        assert!(matches!(parse_cell("42"), Value::Int(42)));
        assert!(matches!(parse_cell("4.5"), Value::Float(f) if f == 4.5));
        assert!(matches!(parse_cell("TRUE"), Value::Bool(true)));
        assert!(matches!(parse_cell("2024-01"), Value::Text(ref s) if s == "2024-01"));
    }

    #[test]
    fn test_read_csv() {
        let t = read_csv(CLAIMS.as_bytes()).unwrap();
        assert_eq!(
            t.columns(),
            &["month", "clinic", "reject_count", "total_count"]
        );
        assert_eq!(t.len(), 6);
        assert_eq!(t.value(0, "reject_count"), Some(&Value::Int(12)));
        assert_eq!(t.value(5, "reject_count"), Some(&Value::Null));
    }

    #[test]
    fn test_missing_count_surfaces_as_division_error() {
        let t = read_csv(CLAIMS.as_bytes()).unwrap();
        let by = Stratification::By(vec!["clinic".into()]);
        let err = p_chart_limits(&t, "reject_count", "total_count", "month", &by).unwrap_err();
        assert!(matches!(err, ShewhartError::Division(_)));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = read_csv("a,b\n1,2\n3\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ShewhartError::Io(_)));
    }

    #[test]
    fn test_write_then_read() {
        let src = CLAIMS.replace(",,", ",6,");
        let t = read_csv(src.as_bytes()).unwrap();
        let by = Stratification::By(vec!["clinic".into()]);
        let out = p_chart_limits(&t, "reject_count", "total_count", "month", &by).unwrap();

        let mut buf = Vec::new();
        write_csv(&out, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text.lines().next(),
            Some("month,clinic,reject_count,total_count,center,lcl,ucl,sc_weight,lcl_prime,ucl_prime,sc_weight_prime")
        );

        let back = read_csv(text.as_bytes()).unwrap();
        assert_eq!(back.len(), out.len());
        assert_eq!(back.value(0, "center"), out.value(0, "center"));
    }

    #[test]
    fn test_missing_file() {
        let err = read_csv_path("/nonexistent/claims.csv").unwrap_err();
        assert!(matches!(err, ShewhartError::Io(_)));
    }
}
