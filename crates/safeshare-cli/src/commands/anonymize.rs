use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use safeshare_core::crypto::{read_encrypted_mapping, save_mapping_json, write_encrypted_mapping};
use safeshare_core::io::secure_delete;
use safeshare_core::{AnonymizationEngine, ColumnSelections, PiiDetector, Table, TokenMode};

use crate::args::AnonymizeArgs;
use crate::commands::{
    build_detector, load_config, load_table, require_password, resolve_threshold,
    selections_from_specs, spinner, write_table,
};

pub fn run(args: &AnonymizeArgs) -> Result<()> {
    let config = load_config()?;

    if args.mapping.is_none() && args.plain_mapping.is_none() {
        eprintln!(
            "Warning: no --mapping given. The anonymization cannot be reversed after this run."
        );
    }
    // Fail on a missing password before doing any work
    let password = match &args.mapping {
        Some(_) => Some(require_password(args.password.as_deref())?),
        None => None,
    };

    // Phase 1: Load and select columns
    let pb = spinner("1/3", "Reading input...")?;
    let table = load_table(&args.input, &config)?;
    let mut selections = selections_from_specs(&args.columns, &table)?;
    if args.auto {
        let threshold = resolve_threshold(args.threshold, &config)?;
        let detector = build_detector(&config)?;
        add_detected_columns(&detector, &table, threshold, &mut selections);
    }
    pb.finish_with_message(format!(
        "Reading input... ✓ {} rows, {} columns selected",
        table.row_count(),
        selections.len()
    ));

    if selections.is_empty() {
        bail!("No columns selected. Use --column NAME=CATEGORY or --auto");
    }
    for (column, category) in &selections {
        eprintln!("  {} → {}", column, category);
    }

    // Phase 2: Anonymize
    let mut engine = match (&args.mapping, password) {
        (Some(path), Some(pw)) if args.extend && path.exists() => {
            let existing = read_encrypted_mapping(path, pw)
                .with_context(|| format!("Failed to open mapping {}", path.display()))?;
            eprintln!("Extending mapping with {} existing values", existing.len());
            AnonymizationEngine::from_mapping(existing)
        }
        _ => AnonymizationEngine::new(),
    };
    let mode = TokenMode::from_deterministic(args.deterministic || config.deterministic());
    tracing::debug!(columns = selections.len(), ?mode, "starting anonymization");

    let total_rows = (table.row_count() * selections.len()) as u64;
    let pb2 = ProgressBar::new(total_rows);
    pb2.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [2/3] Anonymizing... {bar:40.cyan/dim} {pos}/{len} ({eta})")?
            .progress_chars("█▓░"),
    );
    let anonymized = engine.anonymize_table_with(&table, &selections, mode, |_, rows| {
        pb2.inc(rows as u64);
    });
    pb2.finish_with_message("Anonymizing... ✓");

    // Phase 3: Output
    let pb3 = spinner("3/3", "Writing output...")?;
    write_table(&args.output, &anonymized)?;
    if let (Some(path), Some(pw)) = (&args.mapping, password) {
        write_encrypted_mapping(engine.mappings(), pw, path)
            .with_context(|| format!("Failed to write mapping {}", path.display()))?;
    }
    if let Some(path) = &args.plain_mapping {
        save_mapping_json(engine.mappings(), path)?;
    }
    pb3.finish_with_message(format!("Writing output... ✓ {}", args.output.display()));

    let stats = engine.statistics();
    eprintln!(
        "{} unique values mapped across {} categories",
        stats.total_values_mapped, stats.categories_used
    );
    if let Some(path) = &args.mapping {
        eprintln!("Encrypted mapping written to {}", path.display());
    }
    if let Some(path) = &args.plain_mapping {
        eprintln!(
            "Warning: {} holds original values in clear text. Delete it when done.",
            path.display()
        );
    }

    if args.shred_input {
        secure_delete(&args.input)
            .with_context(|| format!("Failed to delete {}", args.input.display()))?;
        eprintln!("Input {} overwritten and deleted", args.input.display());
    }

    Ok(())
}

/// Add every flagged column that was not selected by hand, using the
/// detector's suggested category.
fn add_detected_columns(
    detector: &PiiDetector,
    table: &Table,
    threshold: f64,
    selections: &mut ColumnSelections,
) {
    for name in detector.scan_table(table, threshold).keys() {
        if selections.contains_key(name) {
            continue;
        }
        if let Some(values) = table.column(name) {
            selections.insert(name.clone(), detector.suggest_category(name, values));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use safeshare_core::{CellValue, PiiCategory};

    #[test]
    fn test_auto_selection_keeps_manual_choice() {
        let table = Table::from_columns(vec![
            (
                "contact",
                vec![CellValue::from("a@b.co"), CellValue::from("c@d.co")],
            ),
            (
                "tz",
                vec![CellValue::Int(123456782), CellValue::from("000000018")],
            ),
            ("amount", vec![CellValue::Int(5), CellValue::Int(7)]),
        ])
        .unwrap();

        let mut selections = ColumnSelections::new();
        selections.insert("contact".to_string(), PiiCategory::Other);
        add_detected_columns(&PiiDetector::new(), &table, 0.1, &mut selections);

        assert_eq!(selections["contact"], PiiCategory::Other);
        assert_eq!(selections["tz"], PiiCategory::NationalId);
        assert!(!selections.contains_key("amount"));
    }
}
