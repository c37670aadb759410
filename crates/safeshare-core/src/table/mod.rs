//! # Table Model
//!
//! The in-memory tabular value exchanged between the file layer and the
//! core: an ordered set of named columns, each an ordered sequence of typed
//! cells with an explicit `Null` marker.

pub mod value;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Result, SafeShareError};

pub use value::CellValue;

/// An ordered set of equally long, named columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: IndexMap<String, Vec<CellValue>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, cells)` pairs, rejecting ragged input.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<CellValue>)>,
        S: Into<String>,
    {
        let mut table = Table::new();
        for (name, cells) in columns {
            table.push_column(name, cells)?;
        }
        Ok(table)
    }

    /// Append a column. Its length must match the existing row count, and
    /// its name must not already be present.
    pub fn push_column(&mut self, name: impl Into<String>, cells: Vec<CellValue>) -> Result<()> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(SafeShareError::Validation {
                message: format!("duplicate column '{}'", name),
            });
        }
        if !self.columns.is_empty() && cells.len() != self.row_count() {
            return Err(SafeShareError::Validation {
                message: format!(
                    "column '{}' has {} rows, expected {}",
                    name,
                    cells.len(),
                    self.row_count()
                ),
            });
        }
        self.columns.insert(name, cells);
        Ok(())
    }

    /// Swap the cells of an existing column. Lengths must match.
    pub(crate) fn replace_column(&mut self, name: &str, cells: Vec<CellValue>) {
        if let Some(slot) = self.columns.get_mut(name) {
            debug_assert_eq!(slot.len(), cells.len());
            *slot = cells;
        }
    }

    pub fn column(&self, name: &str) -> Option<&[CellValue]> {
        self.columns.get(name).map(|c| c.as_slice())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[CellValue])> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    pub fn row_count(&self) -> usize {
        self.columns.values().next().map(|c| c.len()).unwrap_or(0)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }

    /// The cells of row `index`, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&CellValue>> {
        if index >= self.row_count() {
            return None;
        }
        Some(self.columns.values().map(|c| &c[index]).collect())
    }

    pub fn info(&self) -> TableInfo {
        TableInfo {
            rows: self.row_count(),
            columns: self.column_count(),
            column_names: self.columns.keys().cloned().collect(),
        }
    }
}

/// Basic shape information for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableInfo {
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Table {
        Table::from_columns(vec![
            ("name", vec!["Dana".into(), "Noa".into()]),
            ("age", vec![CellValue::Int(31), CellValue::Null]),
        ])
        .unwrap()
    }

    #[test]
    fn test_shape_and_order() {
        let t = people();
        assert_eq!(t.shape(), (2, 2));
        assert_eq!(t.column_names().collect::<Vec<_>>(), vec!["name", "age"]);
        assert_eq!(t.row(1).unwrap()[1], &CellValue::Null);
        assert!(t.row(2).is_none());
    }

    #[test]
    fn test_ragged_column_rejected() {
        let mut t = people();
        let err = t.push_column("city", vec!["Haifa".into()]).unwrap_err();
        assert!(err.to_string().contains("city"));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let mut t = people();
        assert!(t.push_column("name", vec![CellValue::Null; 2]).is_err());
    }

    #[test]
    fn test_empty_table() {
        let t = Table::new();
        assert_eq!(t.shape(), (0, 0));
        assert_eq!(t.info().column_names.len(), 0);
    }
}
