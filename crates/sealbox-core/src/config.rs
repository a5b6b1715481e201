use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration (loaded from sealbox.toml)
///
/// The master password is deliberately NOT part of this schema: it is read
/// from the `SEALBOX_MASTER_PASSWORD` environment variable only and never
/// touches disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SealboxConfig {
    pub storage: StorageConfig,
    pub log: LogConfig,
}

/// Which OpenDAL service backs the object and metadata stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// S3-compatible endpoint (credentials from AWS_ACCESS_KEY_ID /
    /// AWS_SECRET_ACCESS_KEY)
    S3,
    /// Local filesystem directory
    Fs,
    /// In-memory, for tests and scratch use
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// S3 endpoint
    pub endpoint: String,
    /// S3 region (default: us-east-1)
    pub region: String,
    /// Bucket name
    pub bucket: String,
    /// Root directory for the fs backend
    pub root: PathBuf,
    /// Refuse plaintext HTTP S3 endpoints
    pub enforce_tls: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Fs,
            endpoint: "http://localhost:9000".into(),
            region: "us-east-1".into(),
            bucket: "sealbox".into(),
            root: PathBuf::from("~/.local/share/sealbox"),
            enforce_tls: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}
