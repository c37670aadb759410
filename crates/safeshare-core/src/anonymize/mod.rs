//! # Consistent Anonymization
//!
//! Replaces PII values with category-scoped tokens (`EMAIL-001`,
//! `ID-3f2a9c1b`, ...) while preserving referential structure: within one
//! run, equal originals always yield equal tokens, so anonymized tables
//! still join.
//!
//! Sequential tokens depend on first-encounter order and are only stable
//! within a run. Deterministic tokens hash the value and are stable across
//! runs, at the cost of a (tiny) collision probability.

pub mod engine;
pub mod mapping;
pub mod restore;
pub mod token;

pub use engine::{AnonymizationEngine, ColumnSelections};
pub use mapping::{AnonymizationMapping, CategoryStatistics, MappingStatistics};
pub use restore::restore_table;
pub use token::TokenMode;
