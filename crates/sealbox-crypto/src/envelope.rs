//! Envelope codec: AES-256-CBC with PKCS#7 padding over per-file derived keys
//!
//! `encrypt` draws a fresh salt and IV from the CSPRNG for every call, so
//! encrypting the same plaintext twice yields different ciphertext and a
//! different record — there is no nonce reuse to begin with. `decrypt`
//! re-derives the key from the stored salt; nothing is cached between calls
//! and both operations are safe to run concurrently without coordination.
//!
//! Tamper detection is best-effort: CBC+PKCS#7 rejects corrupted input when
//! the padding no longer parses, which is not an authenticated-encryption
//! guarantee. No extra padding-oracle behavior is layered on top of what the
//! primitive itself exposes.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;

use crate::error::CryptoError;
use crate::kdf::derive_key;
use crate::record::SaltIvRecord;
use crate::secret::MasterSecret;
use crate::{BLOCK_SIZE, IV_SIZE, SALT_SIZE};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Output of one encryption: the ciphertext for the blob store and the
/// salt‖iv record for the metadata store.
#[derive(Debug)]
pub struct Envelope {
    pub ciphertext: Vec<u8>,
    pub record: SaltIvRecord,
}

/// Stateless encrypt/decrypt over a single master password.
///
/// The password is an explicit constructor argument (not re-read from the
/// environment at call sites) and is immutable for the codec's lifetime.
#[derive(Debug)]
pub struct EnvelopeCodec {
    secret: MasterSecret,
}

impl EnvelopeCodec {
    pub fn new(secret: MasterSecret) -> Self {
        Self { secret }
    }

    /// Encrypt a plaintext for upload.
    ///
    /// Ciphertext length is the plaintext length rounded up to the next
    /// 16-byte boundary, plus one full block when the plaintext is already
    /// block-aligned (standard PKCS#7). Empty plaintext is allowed and
    /// yields a single padding block.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Envelope, CryptoError> {
        // Reject a missing password before drawing any randomness.
        if self.secret.expose().is_empty() {
            return Err(CryptoError::MissingSecret);
        }

        let mut salt = [0u8; SALT_SIZE];
        let mut iv = [0u8; IV_SIZE];
        let mut rng = rand::thread_rng();
        rng.fill_bytes(&mut salt);
        rng.fill_bytes(&mut iv);

        let key = derive_key(&self.secret, &salt)?;

        let ciphertext = Aes256CbcEnc::new(key.as_bytes().into(), (&iv).into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        tracing::debug!(
            plaintext_len = plaintext.len(),
            ciphertext_len = ciphertext.len(),
            "encrypted envelope"
        );

        Ok(Envelope {
            ciphertext,
            record: SaltIvRecord::new(salt, iv),
        })
    }

    /// Decrypt a stored ciphertext given its salt‖iv record.
    ///
    /// Returns the full plaintext or fails — never partial output. Wrong
    /// password, corrupted ciphertext, and tampering all surface as
    /// [`CryptoError::DecryptionFailed`] when the padding no longer parses.
    pub fn decrypt(
        &self,
        ciphertext: &[u8],
        record: &SaltIvRecord,
    ) -> Result<Vec<u8>, CryptoError> {
        if self.secret.expose().is_empty() {
            return Err(CryptoError::MissingSecret);
        }
        // CBC output is always a nonzero multiple of the block size; anything
        // else is truncation or corruption, not a padding question.
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(CryptoError::DecryptionFailed);
        }

        let key = derive_key(&self.secret, record.salt())?;

        Aes256CbcDec::new(key.as_bytes().into(), record.iv().into())
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CryptoError::DecryptionFailed)
    }

    /// Decrypt using the base64 record string as stored in metadata.
    ///
    /// The record is validated (exactly 32 raw bytes) before any key
    /// derivation or cipher work.
    pub fn decrypt_encoded(
        &self,
        ciphertext: &[u8],
        record: &str,
    ) -> Result<Vec<u8>, CryptoError> {
        let record = SaltIvRecord::decode(record)?;
        self.decrypt(ciphertext, &record)
    }
}
