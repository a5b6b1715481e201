use thiserror::Error;

pub type SealboxResult<T> = Result<T, SealboxError>;

#[derive(Debug, Error)]
pub enum SealboxError {
    #[error("config error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] sealbox_crypto::CryptoError),

    #[error("metadata serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
