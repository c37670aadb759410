//! # Mapping Encryption
//!
//! Password-based protection of the anonymization mapping at rest.
//!
//! Blob layout (the one bit-exact external format of SafeShare):
//!
//! ```text
//! [16-byte salt][12-byte nonce][AES-256-GCM ciphertext + 16-byte tag]
//! ```
//!
//! The key is PBKDF2-HMAC-SHA256(password, salt, 100 000 iterations, 32
//! bytes). Salt and nonce are fresh for every encryption. The plaintext is
//! the UTF-8 JSON encoding of the mapping.
//!
//! Decryption failures are reported as a single opaque
//! [`SafeShareError::Decryption`]: a wrong password and a corrupted file
//! cannot be told apart.

pub mod store;

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::anonymize::AnonymizationMapping;
use crate::error::{Result, SafeShareError};

pub use store::{read_encrypted_mapping, save_mapping_json, write_encrypted_mapping};

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// PBKDF2 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Derive the symmetric key. The buffer is wiped on drop.
fn derive_key(password: &str, salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut *key);
    key
}

/// Serialize `value` to JSON and encrypt it under `password`.
pub fn encrypt<T: Serialize + ?Sized>(value: &T, password: &str) -> Result<Vec<u8>> {
    let plaintext = Zeroizing::new(serde_json::to_vec(value).map_err(|e| {
        SafeShareError::Serialization {
            message: e.to_string(),
        }
    })?);

    let mut rng = rand::rng();
    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce_bytes);

    let key = derive_key(password, &salt);
    let cipher = Aes256Gcm::new_from_slice(&key[..]).map_err(|e| SafeShareError::Encryption {
        message: format!("failed to create cipher: {}", e),
    })?;
    let sealed = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_slice())
        .map_err(|_| SafeShareError::Encryption {
            message: "AEAD encryption failed".to_string(),
        })?;

    let mut blob = Vec::with_capacity(SALT_LEN + NONCE_LEN + sealed.len());
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&sealed);
    Ok(blob)
}

/// Decrypt a blob produced by [`encrypt`] and parse its JSON.
pub fn decrypt<T: DeserializeOwned>(blob: &[u8], password: &str) -> Result<T> {
    if blob.len() < SALT_LEN + NONCE_LEN + TAG_LEN {
        return Err(SafeShareError::Decryption);
    }
    let (salt, rest) = blob.split_at(SALT_LEN);
    let (nonce, sealed) = rest.split_at(NONCE_LEN);

    let key = derive_key(password, salt);
    let cipher = Aes256Gcm::new_from_slice(&key[..]).map_err(|_| SafeShareError::Decryption)?;
    let plaintext = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| SafeShareError::Decryption)?,
    );

    serde_json::from_slice(&plaintext).map_err(|_| SafeShareError::Decryption)
}

/// Encrypt an anonymization mapping.
pub fn encrypt_mapping(mapping: &AnonymizationMapping, password: &str) -> Result<Vec<u8>> {
    tracing::info!("Encrypting mapping ({} values)", mapping.len());
    encrypt(mapping, password)
}

/// Decrypt an anonymization mapping.
pub fn decrypt_mapping(blob: &[u8], password: &str) -> Result<AnonymizationMapping> {
    let mapping: AnonymizationMapping = decrypt(blob, password)?;
    tracing::info!("Mapping decrypted ({} values)", mapping.len());
    Ok(mapping)
}
