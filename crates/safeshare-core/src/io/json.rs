use std::io::Write;

use crate::error::{Result, SafeShareError};
use crate::table::{CellValue, Table};

/// Write a table as a JSON array of row objects, one row at a time.
///
/// Keys follow column order. Dates and timestamps are ISO 8601 strings,
/// `Null` is `null`, non-finite floats are `null`.
pub fn write_json<W: Write>(writer: &mut W, table: &Table) -> Result<()> {
    let keys: Vec<String> = table
        .column_names()
        .map(json_key)
        .collect::<Result<_>>()?;
    let columns: Vec<&[CellValue]> = table.columns().map(|(_, cells)| cells).collect();
    let rows = table.row_count();

    write_str(writer, "[")?;
    for row in 0..rows {
        write_str(writer, "\n  {")?;
        for (col_idx, (key, cells)) in keys.iter().zip(&columns).enumerate() {
            let sep = if col_idx + 1 < keys.len() { "," } else { "" };
            write_str(
                writer,
                &format!("\n    {}: {}{}", key, value_to_json(&cells[row]), sep),
            )?;
        }
        write_str(writer, "\n  }")?;
        if row + 1 < rows {
            write_str(writer, ",")?;
        }
    }
    write_str(writer, if rows == 0 { "]\n" } else { "\n]\n" })?;
    Ok(())
}

fn write_str<W: Write>(writer: &mut W, s: &str) -> Result<()> {
    writer
        .write_all(s.as_bytes())
        .map_err(|e| SafeShareError::Io {
            message: "writing JSON".to_string(),
            source: e,
        })
}

/// RFC 8259 key escaping via serde_json rather than `{:?}`.
fn json_key(s: &str) -> Result<String> {
    serde_json::to_string(s).map_err(|e| SafeShareError::Serialization {
        message: format!("JSON key error: {}", e),
    })
}

fn value_to_json(value: &CellValue) -> serde_json::Value {
    match value {
        CellValue::Null => serde_json::Value::Null,
        CellValue::Bool(b) => serde_json::Value::Bool(*b),
        CellValue::Int(i) => serde_json::json!(*i),
        CellValue::Float(f) => serde_json::json!(*f),
        CellValue::Timestamp(ts) => {
            serde_json::Value::String(ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
        }
        CellValue::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
        CellValue::String(s) => serde_json::Value::String(s.clone()),
    }
}
