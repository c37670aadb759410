use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use safeshare_core::PiiCategory;

#[derive(Parser, Debug)]
#[command(
    name = "safeshare",
    about = "Find and consistently anonymize personal data in tabular files",
    version,
    after_help = "Examples:\n  safeshare scan customers.csv\n  safeshare anonymize customers.csv --auto --output safe.csv --mapping customers.map\n  safeshare anonymize customers.csv --column tz=national_id --column mail=email --output safe.csv --mapping customers.map\n  safeshare restore safe.csv --mapping customers.map --column tz=national_id --output restored.csv\n  safeshare mapping customers.map"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Detect columns that look like personal data
    Scan(ScanArgs),

    /// Replace personal data with consistent tokens
    Anonymize(AnonymizeArgs),

    /// Put original values back using an encrypted mapping
    Restore(RestoreArgs),

    /// Show statistics of an encrypted mapping (never the originals)
    Mapping(MappingArgs),
}

#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Input CSV file
    pub input: PathBuf,

    /// Minimum fraction of sampled values that must match (0, 1]
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Number of sample values shown per flagged column
    #[arg(long, default_value = "3")]
    pub samples: usize,

    /// Output format
    #[arg(long, default_value = "table")]
    pub format: ReportFormat,
}

#[derive(Parser, Debug)]
pub struct AnonymizeArgs {
    /// Input CSV file
    pub input: PathBuf,

    /// Output file (.csv or .json)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Column to anonymize as NAME=CATEGORY (repeatable)
    #[arg(long = "column", value_name = "NAME=CATEGORY", value_parser = parse_column_spec)]
    pub columns: Vec<ColumnSpec>,

    /// Also anonymize every column flagged by a scan
    #[arg(long)]
    pub auto: bool,

    /// Minimum match ratio used by --auto
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Hash-based tokens, stable across runs
    #[arg(long)]
    pub deterministic: bool,

    /// Where to write the encrypted mapping
    #[arg(long)]
    pub mapping: Option<PathBuf>,

    /// Password protecting the mapping
    #[arg(long, env = "SAFESHARE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Continue the existing mapping at --mapping instead of starting fresh
    #[arg(long, requires = "mapping")]
    pub extend: bool,

    /// Also write the mapping as UNENCRYPTED JSON (debugging only)
    #[arg(long)]
    pub plain_mapping: Option<PathBuf>,

    /// Overwrite and delete the input file after a successful run
    #[arg(long)]
    pub shred_input: bool,
}

#[derive(Parser, Debug)]
pub struct RestoreArgs {
    /// Anonymized CSV file
    pub input: PathBuf,

    /// Output file (.csv or .json)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Encrypted mapping file
    #[arg(long)]
    pub mapping: PathBuf,

    /// Password protecting the mapping
    #[arg(long, env = "SAFESHARE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Column to restore as NAME=CATEGORY (repeatable)
    #[arg(long = "column", value_name = "NAME=CATEGORY", value_parser = parse_column_spec, required = true)]
    pub columns: Vec<ColumnSpec>,
}

#[derive(Parser, Debug)]
pub struct MappingArgs {
    /// Encrypted mapping file
    pub path: PathBuf,

    /// Password protecting the mapping
    #[arg(long, env = "SAFESHARE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(long, default_value = "table")]
    pub format: ReportFormat,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ReportFormat {
    Table,
    Json,
}

/// A `NAME=CATEGORY` column selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub column: String,
    pub category: PiiCategory,
}

/// Parse `name=category`. The split is on the last `=`, so column names
/// may contain `=`. Unknown categories become `other`.
pub fn parse_column_spec(raw: &str) -> Result<ColumnSpec, String> {
    let (column, category) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=CATEGORY, got '{}'", raw))?;
    if column.is_empty() {
        return Err(format!("missing column name in '{}'", raw));
    }
    Ok(ColumnSpec {
        column: column.to_string(),
        category: PiiCategory::parse_lossy(category.trim()),
    })
}
