use std::io::{Read, Write};

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{Result, SafeShareError};
use crate::table::{CellValue, Table};

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// One raw field and whether it was enclosed in quotes.
#[derive(Debug, PartialEq)]
struct RawField {
    text: String,
    quoted: bool,
}

/// Parse CSV from a reader into a [`Table`].
///
/// The first record is the header. Every following record must have the
/// same number of fields. Blank lines are skipped.
pub fn parse_csv<R: Read>(reader: R) -> Result<Table> {
    let mut reader = reader;
    let mut input = String::new();
    reader
        .read_to_string(&mut input)
        .map_err(|e| SafeShareError::Io {
            message: "reading CSV input".to_string(),
            source: e,
        })?;
    let input = input.strip_prefix('\u{feff}').unwrap_or(&input);

    let mut records = split_records(input)?.into_iter();
    let header: Vec<String> = match records.next() {
        Some(h) => h.into_iter().map(|f| f.text).collect(),
        None => {
            return Err(SafeShareError::Validation {
                message: "CSV input has no header row".to_string(),
            })
        }
    };

    let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); header.len()];
    for (row_idx, record) in records.enumerate() {
        if record.len() != header.len() {
            return Err(SafeShareError::Validation {
                message: format!(
                    "CSV row {} has {} fields, expected {}",
                    row_idx + 1,
                    record.len(),
                    header.len()
                ),
            });
        }
        for (col, field) in columns.iter_mut().zip(record) {
            col.push(infer_cell(&field.text, field.quoted));
        }
    }

    Table::from_columns(header.into_iter().zip(columns))
}

/// Write a table as CSV: a header line, then one line per row.
///
/// `Null` cells are written as empty fields.
pub fn write_csv<W: Write>(writer: &mut W, table: &Table) -> Result<()> {
    let header = table
        .column_names()
        .map(csv_escape)
        .collect::<Vec<_>>()
        .join(",");
    writeln!(writer, "{}", header).map_err(|e| SafeShareError::Io {
        message: "writing CSV header".to_string(),
        source: e,
    })?;

    let columns: Vec<&[CellValue]> = table.columns().map(|(_, cells)| cells).collect();
    for row in 0..table.row_count() {
        let values: Vec<String> = columns
            .iter()
            .map(|col| csv_escape(&col[row].to_csv_string()))
            .collect();
        writeln!(writer, "{}", values.join(",")).map_err(|e| SafeShareError::Io {
            message: format!("writing CSV row {}", row + 1),
            source: e,
        })?;
    }

    Ok(())
}

/// Split input into records of fields (RFC 4180).
///
/// Quoted fields may contain commas, doubled quotes and line breaks. Both
/// LF and CRLF end a record.
fn split_records(input: &str) -> Result<Vec<Vec<RawField>>> {
    let mut records = Vec::new();
    let mut record: Vec<RawField> = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut line = 1usize;
    let mut quote_line = 0usize;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() && !quoted => {
                quoted = true;
                in_quotes = true;
                quote_line = line;
            }
            ',' => record.push(take_field(&mut field, &mut quoted)),
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                line += 1;
                record.push(take_field(&mut field, &mut quoted));
                finish_record(&mut records, std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(SafeShareError::Validation {
            message: format!("unterminated quoted field starting on line {}", quote_line),
        });
    }
    if !field.is_empty() || quoted || !record.is_empty() {
        record.push(take_field(&mut field, &mut quoted));
        finish_record(&mut records, record);
    }

    Ok(records)
}

fn take_field(field: &mut String, quoted: &mut bool) -> RawField {
    RawField {
        text: std::mem::take(field),
        quoted: std::mem::replace(quoted, false),
    }
}

fn finish_record(records: &mut Vec<Vec<RawField>>, record: Vec<RawField>) {
    let blank = record.len() == 1 && record[0].text.is_empty() && !record[0].quoted;
    if !blank {
        records.push(record);
    }
}

/// Infer a typed cell from raw CSV text.
///
/// Quoted fields stay text. Integers with a leading zero stay text so phone
/// numbers and IDs keep their digits.
fn infer_cell(raw: &str, quoted: bool) -> CellValue {
    if quoted {
        return CellValue::String(raw.to_string());
    }
    if raw.is_empty() {
        return CellValue::Null;
    }
    match raw {
        "true" | "True" | "TRUE" => return CellValue::Bool(true),
        "false" | "False" | "FALSE" => return CellValue::Bool(false),
        _ => {}
    }

    if looks_like_integer(raw) {
        if let Ok(i) = raw.parse::<i64>() {
            return CellValue::Int(i);
        }
        return CellValue::String(raw.to_string());
    }
    if looks_like_float(raw) {
        if let Ok(f) = raw.parse::<f64>() {
            return CellValue::Float(f);
        }
    }
    if raw.len() == 10 {
        if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return CellValue::Date(d);
        }
    }
    if raw.len() >= 19 {
        for fmt in TIMESTAMP_FORMATS {
            if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
                return CellValue::Timestamp(ts);
            }
        }
    }

    CellValue::String(raw.to_string())
}

fn looks_like_integer(raw: &str) -> bool {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && !(digits.len() > 1 && digits.starts_with('0'))
}

fn looks_like_float(raw: &str) -> bool {
    let body = raw.strip_prefix('-').unwrap_or(raw);
    let Some((int_part, frac_part)) = body.split_once('.') else {
        return false;
    };
    !frac_part.is_empty()
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && frac_part.bytes().all(|b| b.is_ascii_digit())
}

/// Escape a string for CSV: quote if it contains comma, quote, or newline.
fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
