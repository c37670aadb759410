use std::collections::HashMap;

use indexmap::IndexMap;

use crate::anonymize::mapping::{AnonymizationMapping, MappingStatistics};
use crate::anonymize::token::{deterministic_token, sequence_number, sequential_token, TokenMode};
use crate::category::PiiCategory;
use crate::table::{CellValue, Table};

/// Column name → category chosen for anonymization.
pub type ColumnSelections = IndexMap<String, PiiCategory>;

/// Replaces original values with consistent, category-scoped tokens.
///
/// One engine is one run: the mapping and the per-prefix counters live here
/// and nowhere else. Within a run the same original (by canonical text)
/// always gets the same token in a category. Counters are shared by every
/// column of the run, so numbering is global per prefix.
#[derive(Debug, Default)]
pub struct AnonymizationEngine {
    mapping: AnonymizationMapping,
    counters: HashMap<&'static str, u64>,
}

impl AnonymizationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue a run from a previously exported mapping.
    ///
    /// Sequential counters resume after the highest number already used per
    /// prefix, so new tokens never collide with restored ones.
    pub fn from_mapping(mapping: AnonymizationMapping) -> Self {
        let mut counters: HashMap<&'static str, u64> = HashMap::new();
        for (category, entries) in mapping.iter() {
            let prefix = category.prefix();
            let highest = entries
                .values()
                .filter_map(|token| sequence_number(prefix, token))
                .max()
                .unwrap_or(0);
            let counter = counters.entry(prefix).or_default();
            *counter = (*counter).max(highest);
        }
        Self { mapping, counters }
    }

    /// Token for a single value. `Null` passes through and consumes nothing.
    pub fn anonymize_value(
        &mut self,
        value: &CellValue,
        category: PiiCategory,
        mode: TokenMode,
    ) -> CellValue {
        if value.is_null() {
            return CellValue::Null;
        }

        let key = value.to_text();
        if let Some(token) = self.mapping.get(category, &key) {
            return CellValue::String(token.to_string());
        }

        let prefix = category.prefix();
        let token = match mode {
            TokenMode::Deterministic => deterministic_token(prefix, &key),
            TokenMode::Sequential => {
                let counter = self.counters.entry(prefix).or_default();
                *counter += 1;
                sequential_token(prefix, *counter)
            }
        };

        self.mapping.insert(category, key, token.clone());
        CellValue::String(token)
    }

    /// Anonymize every value of a column, keeping order and nulls.
    pub fn anonymize_column(
        &mut self,
        values: &[CellValue],
        category: PiiCategory,
        mode: TokenMode,
    ) -> Vec<CellValue> {
        tracing::debug!("Anonymizing column with {} values as {}", values.len(), category);

        let result: Vec<CellValue> = values
            .iter()
            .map(|v| self.anonymize_value(v, category, mode))
            .collect();

        tracing::debug!(
            "{} unique {} values mapped so far",
            self.mapping.category(category).map(|m| m.len()).unwrap_or(0),
            category
        );
        result
    }

    /// A copy of `table` with the selected columns anonymized.
    ///
    /// The input is never modified. Unselected columns are copied as-is;
    /// selections naming absent columns are skipped.
    pub fn anonymize_table(
        &mut self,
        table: &Table,
        selections: &ColumnSelections,
        mode: TokenMode,
    ) -> Table {
        self.anonymize_table_with(table, selections, mode, |_, _| {})
    }

    /// Like [`anonymize_table`](Self::anonymize_table), calling
    /// `on_column(name, rows)` after each selected column is done.
    pub fn anonymize_table_with<F>(
        &mut self,
        table: &Table,
        selections: &ColumnSelections,
        mode: TokenMode,
        mut on_column: F,
    ) -> Table
    where
        F: FnMut(&str, usize),
    {
        tracing::info!("Starting anonymization of {} columns", selections.len());

        let mut result = table.clone();
        for (name, category) in selections {
            let Some(values) = table.column(name) else {
                tracing::debug!("Column '{}' not in table, skipping", name);
                continue;
            };
            let anonymized = self.anonymize_column(values, *category, mode);
            result.replace_column(name, anonymized);
            on_column(name, values.len());
        }

        tracing::info!(
            "Anonymization complete: {} values mapped",
            self.mapping.len()
        );
        result
    }

    /// The accumulated mapping, borrowed.
    pub fn mappings(&self) -> &AnonymizationMapping {
        &self.mapping
    }

    /// End the run and take the mapping.
    pub fn export_mappings(self) -> AnonymizationMapping {
        self.mapping
    }

    pub fn statistics(&self) -> MappingStatistics {
        self.mapping.statistics()
    }
}
