use thiserror::Error;

/// Failure modes of the envelope pipeline.
///
/// None of these are transient: callers must surface them, never retry.
/// Error messages never contain the master password, derived key bytes, or
/// plaintext.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The master password is absent or empty. Checked before any random
    /// generation or cipher work is performed.
    #[error("master password is not configured")]
    MissingSecret,

    /// An argument violated the contract (e.g. a salt that is not 16 bytes).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The stored salt‖iv record is not valid base64 or does not decode to
    /// exactly 32 bytes.
    #[error("malformed salt/iv record: {0}")]
    MalformedRecord(String),

    /// PKCS#7 unpadding failed after decryption: wrong master password,
    /// corrupted ciphertext, or tampering. No partial plaintext is returned.
    #[error("decryption failed: wrong key or corrupted ciphertext")]
    DecryptionFailed,

    /// Internal Argon2 failure. Unreachable with the fixed parameters this
    /// crate compiles in, but propagated rather than panicking.
    #[error("key derivation failed: {0}")]
    Kdf(String),
}
