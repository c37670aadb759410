//! Reversing an anonymization run with its mapping.

use crate::anonymize::engine::ColumnSelections;
use crate::anonymize::mapping::AnonymizationMapping;
use crate::table::{CellValue, Table};

/// Replace known tokens in the selected columns with their originals.
///
/// Originals come back as text (the canonical form they were keyed by).
/// Cells that are not tokens of the column's category, including `Null`,
/// are left as they are.
pub fn restore_table(
    table: &Table,
    selections: &ColumnSelections,
    mapping: &AnonymizationMapping,
) -> Table {
    let mut result = table.clone();
    let mut restored = 0usize;

    for (name, category) in selections {
        let Some(values) = table.column(name) else {
            tracing::debug!("Column '{}' not in table, skipping", name);
            continue;
        };
        let reverse = mapping.reverse(*category);
        let cells: Vec<CellValue> = values
            .iter()
            .map(|v| match v.as_str().and_then(|t| reverse.get(t)) {
                Some(original) => {
                    restored += 1;
                    CellValue::String(original.clone())
                }
                None => v.clone(),
            })
            .collect();
        result.replace_column(name, cells);
    }

    tracing::info!("Restored {} values in {} columns", restored, selections.len());
    result
}
