//! # PII Detection
//!
//! Pattern-based classification of cell values into PII categories. The
//! rules live in a data-driven [`PatternLibrary`] (regex patterns, an
//! optional checksum validator and column-name keywords per category), so
//! new locales are added as data rather than code.
//!
//! Column scans only look at the leading values of each column, keeping
//! detection cost bounded regardless of table size.

pub mod checksum;
pub mod detector;
pub mod patterns;

pub use checksum::{is_valid_national_id, Validator};
pub use detector::{CategorySignal, ColumnScanResult, PiiDetector};
pub use patterns::{DetectionRule, PatternLibrary};
