pub mod anonymize;
pub mod mapping;
pub mod restore;
pub mod scan;

use std::path::Path;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use safeshare_core::config::{read_config, SafeShareConfig};
use safeshare_core::detect::PatternLibrary;
use safeshare_core::io;
use safeshare_core::{ColumnSelections, PiiDetector, Table};

use crate::args::ColumnSpec;

/// Load optional safeshare.toml from the working directory.
pub fn load_config() -> Result<SafeShareConfig> {
    Ok(read_config(Path::new("."))?.unwrap_or_default())
}

/// Detector with the built-in rules plus any configured ones.
pub fn build_detector(config: &SafeShareConfig) -> Result<PiiDetector> {
    let library = PatternLibrary::with_rules(&config.rules)?;
    Ok(PiiDetector::with_library(library).with_sample_cap(config.sample_size()))
}

/// CLI threshold wins over the config file.
pub fn resolve_threshold(flag: Option<f64>, config: &SafeShareConfig) -> Result<f64> {
    let threshold = flag.unwrap_or_else(|| config.threshold());
    if !(threshold > 0.0 && threshold <= 1.0) {
        bail!("--threshold must be in (0, 1], got {}", threshold);
    }
    Ok(threshold)
}

/// Validate and read an input CSV.
pub fn load_table(path: &Path, config: &SafeShareConfig) -> Result<Table> {
    io::validate_file(path, config.max_file_size_mb())?;
    io::read_csv(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Write a table as JSON when the path ends in `.json`, CSV otherwise.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let mut buf = Vec::new();
    if is_json {
        io::write_json(&mut buf, table)?;
    } else {
        io::write_csv(&mut buf, table)?;
    }
    io::write_atomic(path, &buf)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Turn `--column` flags into selections, checking each column exists.
pub fn selections_from_specs(specs: &[ColumnSpec], table: &Table) -> Result<ColumnSelections> {
    let mut selections = ColumnSelections::new();
    for spec in specs {
        if table.column(&spec.column).is_none() {
            bail!(
                "Column '{}' not found. Available: {}",
                spec.column,
                table.column_names().collect::<Vec<_>>().join(", ")
            );
        }
        selections.insert(spec.column.clone(), spec.category);
    }
    Ok(selections)
}

/// Password from the flag or SAFESHARE_PASSWORD.
pub fn require_password(password: Option<&str>) -> Result<&str> {
    match password {
        Some(p) if !p.is_empty() => Ok(p),
        _ => bail!("A password is required. Pass --password or set SAFESHARE_PASSWORD"),
    }
}

pub fn spinner(prefix: &str, message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} [{prefix}] {msg}")?);
    pb.set_prefix(prefix.to_string());
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}
