//! Mapping files on disk.

use std::fs;
use std::path::Path;

use super::{decrypt_mapping, encrypt_mapping};
use crate::anonymize::AnonymizationMapping;
use crate::error::{Result, SafeShareError};
use crate::io::write_atomic;

/// Encrypt `mapping` and write it to `path` atomically.
///
/// Missing parent directories are created. An existing file is only
/// replaced once the new blob is fully on disk.
pub fn write_encrypted_mapping(
    mapping: &AnonymizationMapping,
    password: &str,
    path: &Path,
) -> Result<()> {
    let blob = encrypt_mapping(mapping, password)?;
    write_atomic(path, &blob)?;
    tracing::info!("Encrypted mapping saved to {}", path.display());
    Ok(())
}

/// Read and decrypt a mapping file.
pub fn read_encrypted_mapping(path: &Path, password: &str) -> Result<AnonymizationMapping> {
    let blob = fs::read(path).map_err(|e| SafeShareError::Io {
        message: format!("Failed to read mapping file {}", path.display()),
        source: e,
    })?;
    decrypt_mapping(&blob, password)
}

/// Write the mapping as plain JSON.
///
/// The file holds every original PII value in clear text. Only for
/// debugging; use [`write_encrypted_mapping`] for anything that is kept.
pub fn save_mapping_json(mapping: &AnonymizationMapping, path: &Path) -> Result<()> {
    tracing::warn!(
        "Writing UNENCRYPTED mapping with {} original values to {}",
        mapping.len(),
        path.display()
    );
    let json = serde_json::to_vec_pretty(mapping).map_err(|e| SafeShareError::Serialization {
        message: e.to_string(),
    })?;
    write_atomic(path, &json)
}
