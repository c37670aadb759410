//! # Error Types
//!
//! Defines `SafeShareError`, the unified error enum for every failure mode in
//! the SafeShare pipeline. Detection and anonymization never fail on
//! malformed cell data; errors come from the file layer, the configuration
//! file, and mapping encryption.

use thiserror::Error;

/// All errors that can occur in SafeShare operations.
#[derive(Error, Debug)]
pub enum SafeShareError {
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Wrong password and corrupted data are deliberately indistinguishable.
    #[error("Failed to decrypt mapping: wrong password or corrupted data")]
    Decryption,

    #[error("Failed to encrypt mapping: {message}")]
    Encryption { message: String },

    #[error("Mapping cannot be serialized: {message}")]
    Serialization { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O error: {message}: {source}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SafeShareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decryption_message_is_opaque() {
        let msg = SafeShareError::Decryption.to_string();
        assert!(msg.contains("wrong password or corrupted data"));
        assert!(!msg.contains("tag"), "must not reveal which check failed");
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error as _;

        let err = SafeShareError::Io {
            message: "reading input.csv".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("input.csv"));
    }
}
