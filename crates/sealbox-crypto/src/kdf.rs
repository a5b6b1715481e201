//! Key derivation: Argon2id(master password, per-file salt) → AES-256 key
//!
//! The Argon2id parameters are fixed constants of the deployment, not
//! configuration. Every stored file was encrypted under a key derived with
//! these exact parameters; changing them orphans all previously encrypted
//! objects (a migration, not a config edit).

use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::secret::MasterSecret;
use crate::{KEY_SIZE, SALT_SIZE};

/// Argon2id memory cost in KiB (64 MiB)
const ARGON2_MEM_COST_KIB: u32 = 65536;
/// Argon2id iterations
const ARGON2_TIME_COST: u32 = 3;
/// Argon2id lanes
const ARGON2_PARALLELISM: u32 = 1;

/// A 256-bit AES key derived for a single encrypt or decrypt call.
///
/// Never persisted, never cached across calls; zeroized on drop so the key
/// material does not outlive the call that derived it.
pub struct DerivedKey {
    bytes: [u8; KEY_SIZE],
}

impl DerivedKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derive the AES-256 key for one file from the master password and the
/// file's 16-byte salt.
///
/// Deterministic: the same (password, salt) pair always yields the same key,
/// which is what makes decryption possible from the stored salt alone.
///
/// Errors: [`CryptoError::MissingSecret`] if the password is empty,
/// [`CryptoError::InvalidInput`] if the salt is not exactly [`SALT_SIZE`]
/// bytes. Both are checked before any hashing work.
pub fn derive_key(secret: &MasterSecret, salt: &[u8]) -> Result<DerivedKey, CryptoError> {
    if secret.expose().is_empty() {
        return Err(CryptoError::MissingSecret);
    }
    if salt.len() != SALT_SIZE {
        return Err(CryptoError::InvalidInput(format!(
            "salt must be {SALT_SIZE} bytes, got {}",
            salt.len()
        )));
    }

    let params = Params::new(
        ARGON2_MEM_COST_KIB,
        ARGON2_TIME_COST,
        ARGON2_PARALLELISM,
        Some(KEY_SIZE),
    )
    .map_err(|e| CryptoError::Kdf(e.to_string()))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; KEY_SIZE];
    argon2
        .hash_password_into(secret.expose().as_bytes(), salt, &mut key)
        .map_err(|e| CryptoError::Kdf(e.to_string()))?;

    Ok(DerivedKey::from_bytes(key))
}
