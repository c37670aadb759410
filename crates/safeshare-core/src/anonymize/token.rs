use sha2::{Digest, Sha256};

/// Minimum width of a sequential token suffix.
pub const SEQUENCE_WIDTH: usize = 3;

/// Number of hex characters kept from the digest in deterministic mode.
pub const DIGEST_HEX_LEN: usize = 8;

/// How new tokens are generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenMode {
    /// `PREFIX-001`, `PREFIX-002`, ... in first-encounter order.
    /// Consistent within a run only.
    #[default]
    Sequential,
    /// `PREFIX-<8 hex chars of SHA-256>`. Stable across runs.
    Deterministic,
}

impl TokenMode {
    pub fn from_deterministic(deterministic: bool) -> Self {
        if deterministic {
            TokenMode::Deterministic
        } else {
            TokenMode::Sequential
        }
    }
}

/// `PREFIX-n`, zero-padded to at least three digits; wider numbers grow.
pub fn sequential_token(prefix: &str, n: u64) -> String {
    format!("{}-{:0width$}", prefix, n, width = SEQUENCE_WIDTH)
}

/// `PREFIX-` followed by the first 8 hex characters of SHA-256(text).
pub fn deterministic_token(prefix: &str, text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let hex: String = digest[..DIGEST_HEX_LEN / 2]
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect();
    format!("{}-{}", prefix, hex)
}

/// The counter value of a sequential-looking token with this prefix.
pub fn sequence_number(prefix: &str, token: &str) -> Option<u64> {
    let suffix = token.strip_prefix(prefix)?.strip_prefix('-')?;
    if suffix.len() < SEQUENCE_WIDTH || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}
