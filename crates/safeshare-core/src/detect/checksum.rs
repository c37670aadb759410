//! Checksum validators that confirm a pattern match is structurally valid.

/// Length of a national ID number.
pub const NATIONAL_ID_LEN: usize = 9;

/// A named validator a detection rule can require on top of its pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    /// 9 ASCII digits passing the weighted (1, 2, 1, 2, ...) check.
    NationalIdChecksum,
}

impl Validator {
    /// Look a validator up by its configuration name.
    pub fn from_name(name: &str) -> Option<Validator> {
        match name {
            "national_id_checksum" => Some(Validator::NationalIdChecksum),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Validator::NationalIdChecksum => "national_id_checksum",
        }
    }

    pub fn validate(&self, candidate: &str) -> bool {
        match self {
            Validator::NationalIdChecksum => is_valid_national_id(candidate),
        }
    }
}

/// Validate a national ID number.
///
/// Digits at even (0-indexed) positions count once, digits at odd positions
/// are doubled and a doubled value above 9 is folded to the sum of its
/// digits. The number is valid iff the total is divisible by 10. Anything
/// that is not exactly nine ASCII digits is rejected.
pub fn is_valid_national_id(candidate: &str) -> bool {
    let bytes = candidate.as_bytes();
    if bytes.len() != NATIONAL_ID_LEN || !bytes.iter().all(u8::is_ascii_digit) {
        return false;
    }

    let total: u32 = bytes
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            let weighted = if i % 2 == 0 { digit } else { digit * 2 };
            if weighted > 9 {
                weighted / 10 + weighted % 10
            } else {
                weighted
            }
        })
        .sum();

    total % 10 == 0
}
