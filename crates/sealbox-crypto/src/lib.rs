//! sealbox-crypto: per-file envelope encryption
//!
//! Pipeline: plaintext → Argon2id(master password, per-file salt) → AES-256-CBC
//! with PKCS#7 padding → ciphertext + salt‖iv record
//!
//! Every file gets its own 16-byte random salt and 16-byte random IV, so each
//! file is encrypted under an independent key despite the deployment holding a
//! single master password. The salt‖iv pair is stored base64-encoded in the
//! file's metadata record; the ciphertext is the only thing that reaches the
//! blob store.
//!
//! Keys are derived on demand and zeroized when the call returns. There is no
//! key cache: each decrypt re-derives from the stored salt, which keeps key
//! material out of memory outside a single call's lifetime at the cost of one
//! Argon2id pass per operation.

pub mod envelope;
pub mod error;
pub mod kdf;
pub mod record;
pub mod secret;

pub use envelope::{Envelope, EnvelopeCodec};
pub use error::CryptoError;
pub use kdf::{derive_key, DerivedKey};
pub use record::SaltIvRecord;
pub use secret::MasterSecret;

/// Size of the per-file key-derivation salt in bytes
pub const SALT_SIZE: usize = 16;

/// Size of the AES-CBC initialization vector in bytes
pub const IV_SIZE: usize = 16;

/// Size of a derived AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// AES block size in bytes (PKCS#7 pads to multiples of this)
pub const BLOCK_SIZE: usize = 16;

/// Size of a decoded salt‖iv record in bytes
pub const RECORD_SIZE: usize = SALT_SIZE + IV_SIZE;
