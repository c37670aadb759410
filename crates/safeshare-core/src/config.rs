//! # Configuration File Parser
//!
//! Reads and parses `safeshare.toml`, the optional user configuration file
//! that customizes SafeShare's behavior without requiring CLI flags.
//! Supports:
//!
//! - `[detection]`: match threshold and per-column sample size
//! - `[anonymize]`: default token mode
//! - `[io]`: input size limit
//! - `[[rules]]`: extra detection rules (keywords, patterns, validator)
//!
//! Example `safeshare.toml`:
//!
//! ```toml
//! [detection]
//! threshold = 0.2
//! sample_size = 200
//!
//! [anonymize]
//! deterministic = true
//!
//! [io]
//! max_file_size_mb = 25
//!
//! [[rules]]
//! category = "account"
//! keywords = ["iban"]
//! patterns = ['\bIL[0-9]{21}\b']
//!
//! [[rules]]
//! category = "national_id"
//! keywords = ["teudat"]
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::category::PiiCategory;
use crate::detect::checksum::Validator;
use crate::detect::detector::{DEFAULT_SAMPLE_CAP, DEFAULT_THRESHOLD};
use crate::detect::patterns::DetectionRule;
use crate::error::{Result, SafeShareError};
use crate::io::DEFAULT_MAX_FILE_SIZE_MB;

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "safeshare.toml";

/// Top-level safeshare.toml structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SafeShareConfig {
    pub detection: DetectionConfig,
    pub anonymize: AnonymizeConfig,
    pub io: IoConfig,
    /// Extra detection rules appended to the built-in table.
    pub rules: Vec<RuleConfig>,
}

/// Detection settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum match ratio for a column to be flagged, in (0, 1].
    pub threshold: Option<f64>,
    /// Number of leading values inspected per column.
    pub sample_size: Option<usize>,
}

/// Anonymization defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnonymizeConfig {
    /// Use hash-based tokens instead of sequential counters.
    pub deterministic: Option<bool>,
}

/// File layer settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    pub max_file_size_mb: Option<u64>,
}

/// A user-defined detection rule.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleConfig {
    pub category: PiiCategory,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Name of a built-in validator, e.g. "national_id_checksum".
    #[serde(default)]
    pub validator: Option<String>,
}

impl RuleConfig {
    /// Compile into a detection rule, resolving the validator by name.
    pub fn compile(&self) -> Result<DetectionRule> {
        let validator = match self.validator.as_deref() {
            None => None,
            Some(name) => Some(Validator::from_name(name).ok_or_else(|| {
                SafeShareError::Config {
                    message: format!(
                        "Unknown validator '{}' in {} rule. Known: national_id_checksum",
                        name, self.category
                    ),
                }
            })?),
        };
        DetectionRule::compile(
            self.category,
            self.patterns.as_slice(),
            validator,
            self.keywords.as_slice(),
        )
    }
}

/// Read and parse a safeshare.toml file from the given directory.
///
/// Returns `None` if the file doesn't exist (config is optional).
/// Returns an error if the file exists but can't be parsed or validated.
pub fn read_config(dir: &Path) -> Result<Option<SafeShareConfig>> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path).map_err(|e| SafeShareError::Config {
        message: format!("Failed to read {}: {}", path.display(), e),
    })?;

    let config = parse_config(&content).map_err(|e| match e {
        SafeShareError::Config { message } => SafeShareError::Config {
            message: format!("{}: {}", path.display(), message),
        },
        other => other,
    })?;

    tracing::debug!("Loaded {}", path.display());
    Ok(Some(config))
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<SafeShareConfig> {
    let config: SafeShareConfig = toml::from_str(content).map_err(|e| SafeShareError::Config {
        message: format!("Failed to parse config: {}", e),
    })?;
    config.validate()?;
    Ok(config)
}

impl SafeShareConfig {
    pub fn threshold(&self) -> f64 {
        self.detection.threshold.unwrap_or(DEFAULT_THRESHOLD)
    }

    pub fn sample_size(&self) -> usize {
        self.detection.sample_size.unwrap_or(DEFAULT_SAMPLE_CAP)
    }

    pub fn deterministic(&self) -> bool {
        self.anonymize.deterministic.unwrap_or(false)
    }

    pub fn max_file_size_mb(&self) -> u64 {
        self.io.max_file_size_mb.unwrap_or(DEFAULT_MAX_FILE_SIZE_MB)
    }

    /// Validate semantic constraints that serde cannot enforce.
    pub fn validate(&self) -> Result<()> {
        if let Some(t) = self.detection.threshold {
            if !(t > 0.0 && t <= 1.0) {
                return Err(SafeShareError::Config {
                    message: format!("detection.threshold must be in (0, 1], got {}", t),
                });
            }
        }
        if self.detection.sample_size == Some(0) {
            return Err(SafeShareError::Config {
                message: "detection.sample_size must be at least 1".to_string(),
            });
        }
        if self.io.max_file_size_mb == Some(0) {
            return Err(SafeShareError::Config {
                message: "io.max_file_size_mb must be at least 1".to_string(),
            });
        }
        for (i, rule) in self.rules.iter().enumerate() {
            if rule.keywords.is_empty() && rule.patterns.is_empty() {
                tracing::warn!(
                    "rules[{}] ({}) has neither keywords nor patterns. Ignoring.",
                    i,
                    rule.category
                );
            }
            rule.compile()?;
        }
        Ok(())
    }
}
