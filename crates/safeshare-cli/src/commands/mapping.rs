use anyhow::{Context, Result};
use comfy_table::{Cell, Table as ComfyTable};

use safeshare_core::crypto::read_encrypted_mapping;

use crate::args::{MappingArgs, ReportFormat};
use crate::commands::require_password;

pub fn run(args: &MappingArgs) -> Result<()> {
    let password = require_password(args.password.as_deref())?;
    let mapping = read_encrypted_mapping(&args.path, password)
        .with_context(|| format!("Failed to open mapping {}", args.path.display()))?;
    let stats = mapping.statistics();

    match args.format {
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        ReportFormat::Table => {
            println!(
                "Mapping: {}  Categories: {}  Values: {}",
                args.path.display(),
                stats.categories_used,
                stats.total_values_mapped
            );
            println!();

            let mut t = ComfyTable::new();
            t.set_header(vec!["Category", "Unique values", "Example tokens"]);
            for (category, cs) in &stats.per_category {
                t.add_row(vec![
                    Cell::new(category.to_string()),
                    Cell::new(cs.unique_values),
                    Cell::new(cs.example_tokens.join(", ")),
                ]);
            }
            println!("{}", t);
        }
    }

    Ok(())
}
