use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// A single typed cell of a tabular dataset.
///
/// `Null` is the explicit missing marker. Detection and anonymization pass
/// it through untouched; every other variant is compared and hashed through
/// its textual form (see [`CellValue::to_text`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
    String(String),
}

impl CellValue {
    /// Textual representation used for pattern matching, hashing and as
    /// the mapping key.
    ///
    /// Integral floats keep their fractional part (`5.0`), so `Int(5)` and
    /// `String("5")` share a key while `Float(5.0)` does not. `Null` maps
    /// to the empty string but is never used as a key.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => format!("{:?}", f),
            CellValue::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::String(s) => s.clone(),
        }
    }

    /// Convert to a CSV-friendly string. `Null` becomes an empty field.
    pub fn to_csv_string(&self) -> String {
        match self {
            CellValue::Float(f) => f.to_string(),
            other => other.to_text(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Null => write!(f, "NULL"),
            other => write!(f, "{}", other.to_text()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Null)
    }
}
