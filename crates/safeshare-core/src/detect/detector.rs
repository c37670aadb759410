use indexmap::IndexMap;
use serde::Serialize;

use crate::category::PiiCategory;
use crate::detect::patterns::PatternLibrary;
use crate::table::{CellValue, Table};

/// Default number of leading values inspected per column.
pub const DEFAULT_SAMPLE_CAP: usize = 100;

/// Default minimum match ratio for a column to be flagged.
pub const DEFAULT_THRESHOLD: f64 = 0.10;

/// Default number of preview values returned by `sample_values`.
pub const DEFAULT_PREVIEW_COUNT: usize = 3;

/// Matches of one category within a column sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySignal {
    pub count: usize,
    /// `count / sample_size`.
    pub ratio: f64,
}

/// Per-column scan outcome.
///
/// `flagged` only holds categories whose ratio reached the threshold. A
/// column can be flagged for several categories at once; choosing between
/// them is left to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnScanResult {
    /// Number of values inspected (nulls included).
    pub sample_size: usize,
    pub flagged: IndexMap<PiiCategory, CategorySignal>,
}

impl ColumnScanResult {
    pub fn is_flagged(&self) -> bool {
        !self.flagged.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = PiiCategory> + '_ {
        self.flagged.keys().copied()
    }
}

/// Classifies cell values into PII categories.
///
/// The detector is read-only: it never stores the values it inspects.
#[derive(Debug, Clone)]
pub struct PiiDetector {
    library: PatternLibrary,
    sample_cap: usize,
}

impl PiiDetector {
    pub fn new() -> Self {
        Self::with_library(PatternLibrary::builtin())
    }

    pub fn with_library(library: PatternLibrary) -> Self {
        Self {
            library,
            sample_cap: DEFAULT_SAMPLE_CAP,
        }
    }

    /// Override how many leading values `scan_column` inspects (min 1).
    pub fn with_sample_cap(mut self, sample_cap: usize) -> Self {
        self.sample_cap = sample_cap.max(1);
        self
    }

    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }

    pub fn sample_cap(&self) -> usize {
        self.sample_cap
    }

    /// Whether `value` belongs to `category`. `Null` never does.
    pub fn detect_category(&self, value: &CellValue, category: PiiCategory) -> bool {
        if value.is_null() {
            return false;
        }
        self.library.matches(category, &value.to_text())
    }

    /// Every category `value` belongs to, in precedence order.
    pub fn detect_categories(&self, value: &CellValue) -> Vec<PiiCategory> {
        if value.is_null() {
            return Vec::new();
        }
        let text = value.to_text();
        self.library
            .content_categories()
            .into_iter()
            .filter(|c| self.library.matches(*c, &text))
            .collect()
    }

    /// Scan the leading values of a column and flag categories whose match
    /// ratio reaches `threshold`.
    ///
    /// A threshold of zero flags every content category of a non-empty
    /// sample, matched or not. An empty sample flags nothing.
    pub fn scan_column(&self, values: &[CellValue], threshold: f64) -> ColumnScanResult {
        let sample = &values[..values.len().min(self.sample_cap)];
        let categories = self.library.content_categories();
        let mut counts: IndexMap<PiiCategory, usize> =
            categories.iter().map(|c| (*c, 0)).collect();

        for value in sample.iter().filter(|v| !v.is_null()) {
            let text = value.to_text();
            for category in &categories {
                if self.library.matches(*category, &text) {
                    *counts.entry(*category).or_default() += 1;
                }
            }
        }

        let sample_size = sample.len();
        let flagged = if sample_size == 0 {
            IndexMap::new()
        } else {
            counts
                .into_iter()
                .filter_map(|(category, count)| {
                    let ratio = count as f64 / sample_size as f64;
                    (ratio >= threshold).then_some((category, CategorySignal { count, ratio }))
                })
                .collect()
        };

        ColumnScanResult {
            sample_size,
            flagged,
        }
    }

    /// Scan every column; only flagged columns are returned, in table order.
    pub fn scan_table(&self, table: &Table, threshold: f64) -> IndexMap<String, ColumnScanResult> {
        tracing::info!("Scanning table with {} columns", table.column_count());

        let mut results = IndexMap::new();
        for (name, values) in table.columns() {
            let result = self.scan_column(values, threshold);
            if result.is_flagged() {
                tracing::debug!(
                    column = name,
                    categories = ?result.categories().collect::<Vec<_>>(),
                    "column flagged"
                );
                results.insert(name.to_string(), result);
            }
        }

        tracing::info!("Scan complete: {} columns flagged", results.len());
        results
    }

    /// The first `n` non-null values of a column as text, for review.
    pub fn sample_values(&self, values: &[CellValue], n: usize) -> Vec<String> {
        values
            .iter()
            .filter(|v| !v.is_null())
            .take(n)
            .map(CellValue::to_text)
            .collect()
    }

    /// Guess a single category for a column.
    ///
    /// Column-name keywords win; otherwise the first category (national
    /// ID, then email, then phone) matched by any sampled value. Falls back
    /// to `Other`.
    pub fn suggest_category(&self, column_name: &str, values: &[CellValue]) -> PiiCategory {
        if let Some(category) = self.library.category_for_column_name(column_name) {
            return category;
        }

        let sample = &values[..values.len().min(self.sample_cap)];
        self.library
            .content_categories()
            .into_iter()
            .find(|c| sample.iter().any(|v| self.detect_category(v, *c)))
            .unwrap_or(PiiCategory::Other)
    }
}

impl Default for PiiDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<CellValue> {
        values.iter().map(|v| CellValue::from(*v)).collect()
    }

    #[test]
    fn test_detect_category_is_pure() {
        let d = PiiDetector::new();
        let v = CellValue::from("dana@example.com");
        let first = d.detect_category(&v, PiiCategory::Email);
        let second = d.detect_category(&v, PiiCategory::Email);
        assert!(first);
        assert_eq!(first, second);
    }

    #[test]
    fn test_null_matches_nothing() {
        let d = PiiDetector::new();
        for c in PiiCategory::ALL {
            assert!(!d.detect_category(&CellValue::Null, c));
        }
        assert!(d.detect_categories(&CellValue::Null).is_empty());
    }

    #[test]
    fn test_non_string_values_are_coerced() {
        let d = PiiDetector::new();
        assert!(d.detect_category(&CellValue::Int(123456782), PiiCategory::NationalId));
        // Spreadsheet floats keep their ".0" but the digit run still stands alone.
        assert!(d.detect_category(&CellValue::Float(123456782.0), PiiCategory::NationalId));
    }

    #[test]
    fn test_categories_without_patterns_never_match_content() {
        let d = PiiDetector::new();
        assert!(!d.detect_category(&CellValue::from("Dana Levi"), PiiCategory::Name));
        assert!(!d.detect_category(&CellValue::from("x"), PiiCategory::Other));
    }

    #[test]
    fn test_detect_categories_multiple() {
        let d = PiiDetector::new();
        let v = CellValue::from("123456782, dana@example.com, 052-1234567");
        assert_eq!(
            d.detect_categories(&v),
            vec![PiiCategory::NationalId, PiiCategory::Email, PiiCategory::Phone]
        );
    }

    #[test]
    fn test_threshold_boundary() {
        let d = PiiDetector::new();
        let mut values = strings(&["dana@example.com", "noa@example.com", "avi@example.com"]);
        values.extend((0..17).map(|i| CellValue::from(format!("note {}", i))));
        assert_eq!(values.len(), 20);

        let flagged = d.scan_column(&values, 0.10);
        let signal = &flagged.flagged[&PiiCategory::Email];
        assert_eq!(signal.count, 3);
        assert!((signal.ratio - 0.15).abs() < 1e-9);

        let not_flagged = d.scan_column(&values, 0.20);
        assert!(!not_flagged.is_flagged());
    }

    #[test]
    fn test_zero_threshold_flags_every_content_category() {
        let d = PiiDetector::new();
        let r = d.scan_column(&strings(&["dana@example.com", "Haifa"]), 0.0);
        let flagged: Vec<PiiCategory> = r.flagged.keys().copied().collect();
        assert_eq!(flagged, d.library.content_categories());
        assert_eq!(r.flagged[&PiiCategory::Email].count, 1);
        assert_eq!(r.flagged[&PiiCategory::Phone].count, 0);
        assert_eq!(r.flagged[&PiiCategory::Phone].ratio, 0.0);
    }

    #[test]
    fn test_ratio_denominator_counts_nulls() {
        let d = PiiDetector::new();
        let values = vec![CellValue::from("0521234567"), CellValue::Null, CellValue::Null, CellValue::Null];
        let r = d.scan_column(&values, 0.10);
        assert_eq!(r.sample_size, 4);
        assert!((r.flagged[&PiiCategory::Phone].ratio - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_sample_cap_limits_scan() {
        let d = PiiDetector::new().with_sample_cap(10);
        let mut values: Vec<CellValue> = (0..10).map(|i| CellValue::Int(i)).collect();
        values.extend(std::iter::repeat(CellValue::from("a@b.co")).take(90));
        let r = d.scan_column(&values, 0.01);
        assert_eq!(r.sample_size, 10);
        assert!(!r.is_flagged());
    }

    #[test]
    fn test_empty_column() {
        let d = PiiDetector::new();
        let r = d.scan_column(&[], 0.0);
        assert_eq!(r.sample_size, 0);
        assert!(!r.is_flagged());
    }

    #[test]
    fn test_scan_table_returns_only_flagged_in_order() {
        let d = PiiDetector::new();
        let table = Table::from_columns(vec![
            ("mail", strings(&["a@b.co", "c@d.org"])),
            ("amount", vec![CellValue::Int(10), CellValue::Int(20)]),
            ("tz", strings(&["123456782", "000000018"])),
        ])
        .unwrap();

        let results = d.scan_table(&table, DEFAULT_THRESHOLD);
        assert_eq!(results.keys().collect::<Vec<_>>(), vec!["mail", "tz"]);
        assert_eq!(results["tz"].flagged[&PiiCategory::NationalId].count, 2);
    }

    #[test]
    fn test_sample_values_skips_nulls() {
        let d = PiiDetector::new();
        let values = vec![CellValue::Null, CellValue::Int(1), CellValue::Null, "two".into(), "three".into()];
        assert_eq!(d.sample_values(&values, 2), vec!["1", "two"]);
        assert_eq!(d.sample_values(&values, 10).len(), 3);
    }

    #[test]
    fn test_suggest_category_by_name_then_content() {
        let d = PiiDetector::new();
        assert_eq!(d.suggest_category("Email Address", &[]), PiiCategory::Email);
        assert_eq!(
            d.suggest_category("contact", &strings(&["", "052-1234567"])),
            PiiCategory::Phone
        );
        assert_eq!(
            d.suggest_category("misc", &strings(&["a@b.co", "123456782"])),
            PiiCategory::NationalId
        );
        assert_eq!(d.suggest_category("notes", &strings(&["hello"])), PiiCategory::Other);
    }
}
