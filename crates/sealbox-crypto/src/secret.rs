//! Master password holder
//!
//! The deployment holds exactly one master password, sourced from the
//! `SEALBOX_MASTER_PASSWORD` environment variable at process start. It is
//! never persisted, never serialized, and never logged; the only consumer is
//! the key-derivation path.

use secrecy::{ExposeSecret, SecretString};

use crate::error::CryptoError;

/// The process-wide master password.
///
/// Constructed once at startup and moved into the [`EnvelopeCodec`]; there is
/// no mutation after construction. Emptiness is enforced at the point of use
/// so both load-time and call-time misconfiguration surface as
/// [`CryptoError::MissingSecret`].
///
/// [`EnvelopeCodec`]: crate::envelope::EnvelopeCodec
pub struct MasterSecret(SecretString);

impl MasterSecret {
    /// Environment variable the password is read from.
    pub const ENV_VAR: &'static str = "SEALBOX_MASTER_PASSWORD";

    pub fn new(password: SecretString) -> Self {
        Self(password)
    }

    /// Read the password from [`Self::ENV_VAR`].
    ///
    /// An unset or empty variable is a fatal configuration error, never
    /// silently defaulted.
    pub fn from_env() -> Result<Self, CryptoError> {
        match std::env::var(Self::ENV_VAR) {
            Ok(value) if !value.is_empty() => Ok(Self(SecretString::from(value))),
            _ => Err(CryptoError::MissingSecret),
        }
    }

    pub(crate) fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MasterSecret").field(&"[REDACTED]").finish()
    }
}
