use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::category::PiiCategory;

/// Number of example tokens reported per category.
pub const STATISTICS_EXAMPLES: usize = 3;

/// The record of every original → token assignment of one run.
///
/// Two levels: category, then canonical original text → token. Both levels
/// keep first-insertion order, so exports and statistics are stable. This
/// is the most sensitive artifact SafeShare produces; persist it only via
/// [`crate::crypto`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AnonymizationMapping {
    categories: IndexMap<PiiCategory, IndexMap<String, String>>,
}

impl AnonymizationMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: PiiCategory, original: &str) -> Option<&str> {
        self.categories
            .get(&category)
            .and_then(|m| m.get(original))
            .map(|t| t.as_str())
    }

    pub(crate) fn insert(&mut self, category: PiiCategory, original: String, token: String) {
        self.categories
            .entry(category)
            .or_default()
            .insert(original, token);
    }

    /// The original → token table of one category.
    pub fn category(&self, category: PiiCategory) -> Option<&IndexMap<String, String>> {
        self.categories.get(&category)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PiiCategory, &IndexMap<String, String>)> {
        self.categories.iter().map(|(c, m)| (*c, m))
    }

    /// Number of categories with at least one entry.
    pub fn category_count(&self) -> usize {
        self.categories.values().filter(|m| !m.is_empty()).count()
    }

    /// Total number of mapped originals across all categories.
    pub fn len(&self) -> usize {
        self.categories.values().map(|m| m.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Token → original table of one category, for reversing a run.
    pub fn reverse(&self, category: PiiCategory) -> HashMap<String, String> {
        self.categories
            .get(&category)
            .map(|m| {
                m.iter()
                    .map(|(original, token)| (token.clone(), original.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Summary counts and a few example tokens per category.
    pub fn statistics(&self) -> MappingStatistics {
        let per_category: IndexMap<PiiCategory, CategoryStatistics> = self
            .categories
            .iter()
            .map(|(category, m)| {
                (
                    *category,
                    CategoryStatistics {
                        unique_values: m.len(),
                        example_tokens: m.values().take(STATISTICS_EXAMPLES).cloned().collect(),
                    },
                )
            })
            .collect();

        MappingStatistics {
            categories_used: per_category.len(),
            total_values_mapped: self.len(),
            per_category,
        }
    }
}

/// Category names are parsed leniently, so several names on disk can land
/// in the same category (`israeli_id` and `national_id`). Their tables are
/// merged; the first token seen for an original wins.
impl<'de> Deserialize<'de> for AnonymizationMapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<String, IndexMap<String, String>>::deserialize(deserializer)?;
        let mut categories: IndexMap<PiiCategory, IndexMap<String, String>> = IndexMap::new();
        for (name, entries) in raw {
            let merged = categories.entry(PiiCategory::parse_lossy(&name)).or_default();
            for (original, token) in entries {
                merged.entry(original).or_insert(token);
            }
        }
        Ok(Self { categories })
    }
}

/// Read-only summary of a mapping. Contains tokens only, never originals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingStatistics {
    pub categories_used: usize,
    pub total_values_mapped: usize,
    pub per_category: IndexMap<PiiCategory, CategoryStatistics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStatistics {
    pub unique_values: usize,
    pub example_tokens: Vec<String>,
}
