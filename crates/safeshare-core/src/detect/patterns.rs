use std::sync::LazyLock;

use regex::Regex;

use crate::category::PiiCategory;
use crate::config::RuleConfig;
use crate::detect::checksum::Validator;
use crate::error::{Result, SafeShareError};

/// A detection rule as written in the built-in table.
struct RuleDefinition {
    category: PiiCategory,
    /// Regexes matched against the cell text; a cell matches if any does.
    patterns: &'static [&'static str],
    /// Optional check every pattern match must also pass.
    validator: Option<Validator>,
    /// Case-insensitive substrings of a column name that suggest the category.
    keywords: &'static [&'static str],
}

/// A compiled, ready-to-use detection rule.
#[derive(Debug, Clone)]
pub struct DetectionRule {
    pub category: PiiCategory,
    patterns: Vec<Regex>,
    validator: Option<Validator>,
    keywords: Vec<String>,
}

impl DetectionRule {
    /// Compile a rule from pattern sources.
    pub fn compile(
        category: PiiCategory,
        patterns: &[impl AsRef<str>],
        validator: Option<Validator>,
        keywords: &[impl AsRef<str>],
    ) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|e| SafeShareError::Config {
                    message: format!("invalid {} pattern '{}': {}", category, p.as_ref(), e),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            category,
            patterns,
            validator,
            keywords: keywords
                .iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
        })
    }

    /// Whether the text contains a match of this rule.
    ///
    /// With a validator, at least one individual match must pass it; a
    /// rejected candidate does not stop the search.
    pub fn matches(&self, text: &str) -> bool {
        match self.validator {
            None => self.patterns.iter().any(|re| re.is_match(text)),
            Some(validator) => self.patterns.iter().any(|re| {
                re.find_iter(text)
                    .any(|m| validator.validate(m.as_str()))
            }),
        }
    }

    /// Whether a (lowercased) column name contains one of the keywords.
    fn matches_column_name(&self, lower_name: &str) -> bool {
        self.keywords.iter().any(|k| lower_name.contains(k.as_str()))
    }

    pub fn has_patterns(&self) -> bool {
        !self.patterns.is_empty()
    }
}

// === Built-in rules ===
//
// National IDs are taken as maximal ASCII digit runs so that a nine-digit
// run glued to further digits never counts; the validator enforces the
// exact length and the checksum.

static BUILTIN_RULES: &[RuleDefinition] = &[
    RuleDefinition {
        category: PiiCategory::NationalId,
        patterns: &[r"[0-9]+"],
        validator: Some(Validator::NationalIdChecksum),
        keywords: &["ת.ז", "תז", "id", "מזהה", "זהות"],
    },
    RuleDefinition {
        category: PiiCategory::Email,
        patterns: &[r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b"],
        validator: None,
        keywords: &["מייל", "email", "דוא\"ל", "אימייל"],
    },
    RuleDefinition {
        category: PiiCategory::Phone,
        patterns: &[
            // landline
            r"\b0[0-9]{1,2}-?[0-9]{7}\b",
            // mobile
            r"\b05[0-9]-?[0-9]{7}\b",
        ],
        validator: None,
        keywords: &["טלפון", "נייד", "phone", "פלאפון", "פרטי קשר"],
    },
    RuleDefinition {
        category: PiiCategory::Name,
        patterns: &[],
        validator: None,
        keywords: &["שם", "name", "מבוטח", "לקוח"],
    },
    RuleDefinition {
        category: PiiCategory::Address,
        patterns: &[],
        validator: None,
        keywords: &["כתובת", "address", "רחוב", "עיר", "משלוח"],
    },
    RuleDefinition {
        category: PiiCategory::Account,
        patterns: &[],
        validator: None,
        keywords: &["חשבון", "account", "בנק"],
    },
];

/// Built-in rules, compiled on first access.
static COMPILED_BUILTIN_RULES: LazyLock<Vec<DetectionRule>> = LazyLock::new(|| {
    BUILTIN_RULES
        .iter()
        .map(|r| {
            DetectionRule::compile(r.category, r.patterns, r.validator, r.keywords)
                .expect("built-in detection patterns are valid")
        })
        .collect()
});

/// The rule table the detector consults, grouped by category.
///
/// Several rules may target the same category; a value belongs to the
/// category if any of them matches.
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    rules: Vec<DetectionRule>,
}

impl PatternLibrary {
    /// The built-in rules.
    pub fn builtin() -> Self {
        Self {
            rules: COMPILED_BUILTIN_RULES.clone(),
        }
    }

    /// A library with no rules at all.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// The built-in rules extended with user-configured ones.
    pub fn with_rules(extra: &[RuleConfig]) -> Result<Self> {
        let mut library = Self::builtin();
        for rule in extra {
            library.add_rule(rule.compile()?);
        }
        Ok(library)
    }

    pub fn add_rule(&mut self, rule: DetectionRule) {
        self.rules.push(rule);
    }

    /// Rules that target `category`.
    pub fn rules_for(&self, category: PiiCategory) -> impl Iterator<Item = &DetectionRule> {
        self.rules.iter().filter(move |r| r.category == category)
    }

    /// Whether any rule of `category` matches the text.
    pub fn matches(&self, category: PiiCategory, text: &str) -> bool {
        self.rules_for(category).any(|r| r.matches(text))
    }

    /// Categories that have at least one content pattern, in precedence order.
    pub fn content_categories(&self) -> Vec<PiiCategory> {
        PiiCategory::ALL
            .into_iter()
            .filter(|c| self.rules_for(*c).any(|r| r.has_patterns()))
            .collect()
    }

    /// First category, in precedence order, whose keywords occur in the
    /// column name.
    pub fn category_for_column_name(&self, column_name: &str) -> Option<PiiCategory> {
        let lower = column_name.to_lowercase();
        PiiCategory::ALL
            .into_iter()
            .find(|c| self.rules_for(*c).any(|r| r.matches_column_name(&lower)))
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_email() {
        let lib = PatternLibrary::builtin();
        assert!(lib.matches(PiiCategory::Email, "contact: dana.levi@example.co.il"));
        assert!(!lib.matches(PiiCategory::Email, "dana.levi at example"));
    }

    #[test]
    fn test_builtin_phone_both_forms() {
        let lib = PatternLibrary::builtin();
        assert!(lib.matches(PiiCategory::Phone, "04-8123456"));
        assert!(lib.matches(PiiCategory::Phone, "0521234567"));
        assert!(lib.matches(PiiCategory::Phone, "call 052-1234567 today"));
        assert!(!lib.matches(PiiCategory::Phone, "1234567"));
    }

    #[test]
    fn test_national_id_requires_checksum() {
        let lib = PatternLibrary::builtin();
        assert!(lib.matches(PiiCategory::NationalId, "123456782"));
        assert!(!lib.matches(PiiCategory::NationalId, "123456789"));
    }

    #[test]
    fn test_national_id_digit_run_must_be_exact() {
        let lib = PatternLibrary::builtin();
        assert!(lib.matches(PiiCategory::NationalId, "ID:123456782"));
        assert!(lib.matches(PiiCategory::NationalId, "abc123456782"));
        assert!(!lib.matches(PiiCategory::NationalId, "1234567820"));
        assert!(!lib.matches(PiiCategory::NationalId, "0123456782"));
    }

    #[test]
    fn test_national_id_any_valid_candidate_counts() {
        let lib = PatternLibrary::builtin();
        assert!(lib.matches(PiiCategory::NationalId, "123456789 / 123456782"));
        assert!(!lib.matches(PiiCategory::NationalId, "123456789 / 123456788"));
    }

    #[test]
    fn test_keyword_categories() {
        let lib = PatternLibrary::builtin();
        assert_eq!(lib.category_for_column_name("Customer Email"), Some(PiiCategory::Email));
        assert_eq!(lib.category_for_column_name("מספר טלפון"), Some(PiiCategory::Phone));
        assert_eq!(lib.category_for_column_name("שם מלא"), Some(PiiCategory::Name));
        assert_eq!(lib.category_for_column_name("Bank Account"), Some(PiiCategory::Account));
        assert_eq!(lib.category_for_column_name("amount"), None);
    }

    #[test]
    fn test_keyword_precedence_prefers_id() {
        // "user_id_name" carries both an id and a name keyword.
        let lib = PatternLibrary::builtin();
        assert_eq!(lib.category_for_column_name("user_id_name"), Some(PiiCategory::NationalId));
    }

    #[test]
    fn test_content_categories() {
        let lib = PatternLibrary::builtin();
        assert_eq!(
            lib.content_categories(),
            vec![PiiCategory::NationalId, PiiCategory::Email, PiiCategory::Phone]
        );
        assert!(PatternLibrary::empty().content_categories().is_empty());
    }

    #[test]
    fn test_with_custom_rule() {
        let extra = vec![RuleConfig {
            category: PiiCategory::Account,
            keywords: vec!["IBAN".to_string()],
            patterns: vec![r"\bIL[0-9]{21}\b".to_string()],
            validator: None,
        }];
        let lib = PatternLibrary::with_rules(&extra).unwrap();
        assert!(lib.matches(PiiCategory::Account, "IL620108000000099999999"));
        assert_eq!(lib.category_for_column_name("iban"), Some(PiiCategory::Account));
    }

    #[test]
    fn test_invalid_custom_pattern_is_config_error() {
        let extra = vec![RuleConfig {
            category: PiiCategory::Account,
            keywords: Vec::new(),
            patterns: vec!["([unclosed".to_string()],
            validator: None,
        }];
        let err = PatternLibrary::with_rules(&extra).unwrap_err();
        assert!(matches!(err, SafeShareError::Config { .. }));
    }
}
