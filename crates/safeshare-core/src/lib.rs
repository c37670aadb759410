pub mod anonymize;
pub mod category;
pub mod config;
pub mod crypto;
pub mod detect;
pub mod error;
pub mod io;
pub mod table;

// Re-export key types for convenience
pub use anonymize::{AnonymizationEngine, AnonymizationMapping, ColumnSelections, TokenMode};
pub use category::PiiCategory;
pub use detect::PiiDetector;
pub use error::{Result, SafeShareError};
pub use table::{CellValue, Table};
