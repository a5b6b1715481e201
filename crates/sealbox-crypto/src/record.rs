//! Salt‖IV record: the one on-disk format this crate defines
//!
//! The 16-byte salt and 16-byte IV of each encryption are concatenated and
//! base64-encoded into an opaque string, stored (by convention) under the
//! `salt` attribute of the file's metadata record. Written once at upload,
//! read-only afterwards, deleted with the record.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::error::CryptoError;
use crate::{IV_SIZE, RECORD_SIZE, SALT_SIZE};

/// The salt and IV of one encryption. Neither half is secret, but the pair
/// is required (and sufficient, together with the master password) to
/// decrypt the matching ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaltIvRecord {
    salt: [u8; SALT_SIZE],
    iv: [u8; IV_SIZE],
}

impl SaltIvRecord {
    pub fn new(salt: [u8; SALT_SIZE], iv: [u8; IV_SIZE]) -> Self {
        Self { salt, iv }
    }

    pub fn salt(&self) -> &[u8; SALT_SIZE] {
        &self.salt
    }

    pub fn iv(&self) -> &[u8; IV_SIZE] {
        &self.iv
    }

    /// base64(salt ‖ iv)
    pub fn encode(&self) -> String {
        let mut raw = [0u8; RECORD_SIZE];
        raw[..SALT_SIZE].copy_from_slice(&self.salt);
        raw[SALT_SIZE..].copy_from_slice(&self.iv);
        BASE64.encode(raw)
    }

    /// Parse a stored record.
    ///
    /// Anything that is not valid base64 for exactly [`RECORD_SIZE`] raw
    /// bytes fails with [`CryptoError::MalformedRecord`] before any cipher
    /// work is attempted — decryption must never proceed with a zero or
    /// garbage IV.
    pub fn decode(encoded: &str) -> Result<Self, CryptoError> {
        let raw = BASE64
            .decode(encoded)
            .map_err(|e| CryptoError::MalformedRecord(format!("invalid base64: {e}")))?;

        if raw.len() != RECORD_SIZE {
            return Err(CryptoError::MalformedRecord(format!(
                "expected {RECORD_SIZE} bytes after decoding, got {}",
                raw.len()
            )));
        }

        let mut salt = [0u8; SALT_SIZE];
        let mut iv = [0u8; IV_SIZE];
        salt.copy_from_slice(&raw[..SALT_SIZE]);
        iv.copy_from_slice(&raw[SALT_SIZE..]);
        Ok(Self { salt, iv })
    }
}

impl std::fmt::Display for SaltIvRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}
