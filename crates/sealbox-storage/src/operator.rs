//! OpenDAL Operator factory for the configured backend

use anyhow::{Context, Result};
use opendal::Operator;

use sealbox_core::config::{StorageBackend, StorageConfig};

/// Build an OpenDAL Operator for the configured backend.
///
/// S3 credentials come from `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`;
/// they are never part of the config file. The retry layer only applies to
/// remote backends — local fs and memory failures are not transient.
pub fn build_operator(cfg: &StorageConfig) -> Result<Operator> {
    match cfg.backend {
        StorageBackend::S3 => build_s3(cfg),
        StorageBackend::Fs => {
            let builder = opendal::services::Fs::default().root(&cfg.root.to_string_lossy());
            Ok(Operator::new(builder)
                .context("creating OpenDAL fs operator")?
                .layer(opendal::layers::LoggingLayer::default())
                .finish())
        }
        StorageBackend::Memory => {
            let builder = opendal::services::Memory::default();
            Ok(Operator::new(builder)
                .context("creating OpenDAL memory operator")?
                .finish())
        }
    }
}

fn build_s3(cfg: &StorageConfig) -> Result<Operator> {
    if cfg.endpoint.starts_with("http://") {
        if cfg.enforce_tls {
            anyhow::bail!(
                "S3 endpoint uses plaintext HTTP ({}), but enforce_tls is enabled. \
                 Use an HTTPS endpoint or set storage.enforce_tls = false for local development.",
                cfg.endpoint
            );
        }
        tracing::warn!(
            endpoint = %cfg.endpoint,
            "S3 endpoint uses plaintext HTTP — ciphertext and credentials are \
             transmitted unencrypted at the transport layer"
        );
    }

    let access_key_id =
        std::env::var("AWS_ACCESS_KEY_ID").context("AWS_ACCESS_KEY_ID is not set")?;
    let secret_access_key =
        std::env::var("AWS_SECRET_ACCESS_KEY").context("AWS_SECRET_ACCESS_KEY is not set")?;

    let builder = opendal::services::S3::default()
        .endpoint(&cfg.endpoint)
        .region(&cfg.region)
        .bucket(&cfg.bucket)
        .access_key_id(&access_key_id)
        .secret_access_key(&secret_access_key);

    let op = Operator::new(builder)
        .context("creating OpenDAL S3 operator")?
        .layer(opendal::layers::LoggingLayer::default())
        .layer(
            opendal::layers::RetryLayer::new()
                .with_max_times(5)
                .with_jitter(),
        )
        .finish();

    Ok(op)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_memory_operator() {
        let cfg = StorageConfig {
            backend: StorageBackend::Memory,
            ..StorageConfig::default()
        };
        assert!(build_operator(&cfg).is_ok());
    }

    #[test]
    fn test_build_fs_operator() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = StorageConfig {
            backend: StorageBackend::Fs,
            root: dir.path().to_path_buf(),
            ..StorageConfig::default()
        };
        assert!(build_operator(&cfg).is_ok());
    }

    #[test]
    fn test_s3_http_with_enforce_tls_fails() {
        let cfg = StorageConfig {
            backend: StorageBackend::S3,
            endpoint: "http://insecure:9000".into(),
            enforce_tls: true,
            ..StorageConfig::default()
        };
        let result = build_operator(&cfg);
        assert!(result.is_err(), "HTTP + enforce_tls must fail");
        assert!(result.unwrap_err().to_string().contains("enforce_tls"));
    }
}
