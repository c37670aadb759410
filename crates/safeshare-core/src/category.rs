use serde::{Deserialize, Serialize};

/// The kind of personal data a value or column carries.
///
/// Serialized in snake_case. Parsing is lenient: any unrecognized name
/// becomes [`PiiCategory::Other`], which anonymizes with the generic `ANON`
/// prefix instead of failing the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PiiCategory {
    NationalId,
    Email,
    Phone,
    Name,
    Address,
    Account,
    Other,
}

impl PiiCategory {
    /// Every category, in detection and keyword-precedence order.
    pub const ALL: [PiiCategory; 7] = [
        PiiCategory::NationalId,
        PiiCategory::Email,
        PiiCategory::Phone,
        PiiCategory::Name,
        PiiCategory::Address,
        PiiCategory::Account,
        PiiCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PiiCategory::NationalId => "national_id",
            PiiCategory::Email => "email",
            PiiCategory::Phone => "phone",
            PiiCategory::Name => "name",
            PiiCategory::Address => "address",
            PiiCategory::Account => "account",
            PiiCategory::Other => "other",
        }
    }

    /// Token prefix for this category.
    pub fn prefix(&self) -> &'static str {
        match self {
            PiiCategory::NationalId => "ID",
            PiiCategory::Email => "EMAIL",
            PiiCategory::Phone => "PHONE",
            PiiCategory::Name => "PERSON",
            PiiCategory::Address => "ADDRESS",
            PiiCategory::Account => "ACCOUNT",
            PiiCategory::Other => "ANON",
        }
    }

    /// Parse a category name, falling back to `Other`.
    ///
    /// Accepts snake_case names, the token prefixes (`ID`, `PERSON`, ...)
    /// and `israeli_id`, the name older mapping files use.
    pub fn parse_lossy(name: &str) -> PiiCategory {
        match name.trim().to_lowercase().as_str() {
            "national_id" | "israeli_id" | "id" => PiiCategory::NationalId,
            "email" => PiiCategory::Email,
            "phone" => PiiCategory::Phone,
            "name" | "person" => PiiCategory::Name,
            "address" => PiiCategory::Address,
            "account" => PiiCategory::Account,
            _ => PiiCategory::Other,
        }
    }
}

impl std::fmt::Display for PiiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for PiiCategory {
    fn from(s: String) -> Self {
        PiiCategory::parse_lossy(&s)
    }
}

impl From<PiiCategory> for String {
    fn from(c: PiiCategory) -> Self {
        c.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert_eq!(PiiCategory::NationalId.prefix(), "ID");
        assert_eq!(PiiCategory::Name.prefix(), "PERSON");
        assert_eq!(PiiCategory::Other.prefix(), "ANON");
    }

    #[test]
    fn test_parse_lossy_falls_back_to_other() {
        assert_eq!(PiiCategory::parse_lossy("EMAIL"), PiiCategory::Email);
        assert_eq!(PiiCategory::parse_lossy("israeli_id"), PiiCategory::NationalId);
        assert_eq!(PiiCategory::parse_lossy("passport"), PiiCategory::Other);
        assert_eq!(PiiCategory::parse_lossy(""), PiiCategory::Other);
    }

    #[test]
    fn test_serde_round_trip_as_string() {
        let json = serde_json::to_string(&PiiCategory::NationalId).unwrap();
        assert_eq!(json, "\"national_id\"");
        let back: PiiCategory = serde_json::from_str("\"phone\"").unwrap();
        assert_eq!(back, PiiCategory::Phone);
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for c in PiiCategory::ALL {
            assert_eq!(PiiCategory::parse_lossy(&c.to_string()), c);
        }
    }
}
