use chrono::Utc;
use uuid::Uuid;

use sealbox_core::types::{FileKind, FileQuery, FileRecord, SpaceUsage};
use sealbox_core::{SealboxError, SealboxResult};
use sealbox_crypto::{CryptoError, EnvelopeCodec};
use sealbox_storage::{MetadataStore, ObjectStore};

/// What the caller knows about an upload besides the bytes
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub name: String,
    pub mime: String,
    pub owner: String,
}

/// Upload/retrieval workflow over the codec and the two stores.
///
/// The contract is binary on the retrieval side: the full decrypted plaintext
/// or a typed error — never partial or garbage output. Cryptographic failures
/// are never retried; transient storage retries live inside the operator's
/// retry layer.
pub struct FileService<M: MetadataStore> {
    codec: EnvelopeCodec,
    objects: ObjectStore,
    metadata: M,
}

impl<M: MetadataStore> FileService<M> {
    pub fn new(codec: EnvelopeCodec, objects: ObjectStore, metadata: M) -> Self {
        Self {
            codec,
            objects,
            metadata,
        }
    }

    /// Encrypt and store a file; returns the saved metadata record.
    pub async fn upload(&self, request: UploadRequest, bytes: &[u8]) -> SealboxResult<FileRecord> {
        let envelope = self.codec.encrypt(bytes)?;
        let blob_id = self.objects.put(envelope.ciphertext).await?;

        let now = Utc::now();
        let extension = request
            .name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let record = FileRecord {
            id: Uuid::new_v4(),
            kind: FileKind::from_name(&request.name),
            name: request.name,
            extension,
            mime: request.mime,
            size: bytes.len() as u64,
            owner: request.owner,
            shared_with: Vec::new(),
            blob_id,
            salt: envelope.record.encode(),
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.metadata.save(&record).await {
            // Don't leave an orphaned ciphertext behind a failed record write.
            if let Err(cleanup) = self.objects.delete(&blob_id).await {
                tracing::warn!(blob_id = %blob_id, error = %cleanup, "orphaned blob cleanup failed");
            }
            return Err(e);
        }

        tracing::info!(
            file_id = %record.id,
            name = %record.name,
            size = record.size,
            owner = %record.owner,
            "uploaded file"
        );
        Ok(record)
    }

    /// Fetch and decrypt a file by id.
    pub async fn retrieve(&self, id: &Uuid) -> SealboxResult<(FileRecord, Vec<u8>)> {
        let record = self.metadata.load(id).await?;
        if record.salt.is_empty() {
            return Err(SealboxError::Crypto(CryptoError::MalformedRecord(
                "salt attribute is missing from the file record".into(),
            )));
        }

        let ciphertext = self.objects.get(&record.blob_id).await?;
        let plaintext = self.codec.decrypt_encoded(&ciphertext, &record.salt)?;

        tracing::info!(file_id = %id, size = plaintext.len(), "retrieved file");
        Ok((record, plaintext))
    }

    pub async fn list(&self, query: &FileQuery) -> SealboxResult<Vec<FileRecord>> {
        self.metadata.list(query).await
    }

    /// Rename, keeping the original extension (the dashboard edits the stem).
    pub async fn rename(&self, id: &Uuid, new_stem: &str) -> SealboxResult<FileRecord> {
        let mut record = self.metadata.load(id).await?;
        record.name = if record.extension.is_empty() {
            new_stem.to_string()
        } else {
            format!("{new_stem}.{}", record.extension)
        };
        record.updated_at = Utc::now();
        self.metadata.save(&record).await?;
        Ok(record)
    }

    /// Replace the share list with the given emails.
    pub async fn update_shared(&self, id: &Uuid, emails: Vec<String>) -> SealboxResult<FileRecord> {
        let mut record = self.metadata.load(id).await?;
        record.shared_with = emails;
        record.updated_at = Utc::now();
        self.metadata.save(&record).await?;
        Ok(record)
    }

    /// Delete the metadata record, then the ciphertext blob.
    pub async fn delete(&self, id: &Uuid) -> SealboxResult<()> {
        let record = self.metadata.load(id).await?;
        self.metadata.delete(id).await?;
        self.objects.delete(&record.blob_id).await?;
        tracing::info!(file_id = %id, "deleted file");
        Ok(())
    }

    /// Per-kind usage totals for one account, against the default quota.
    pub async fn total_space_used(&self, owner: &str) -> SealboxResult<SpaceUsage> {
        let records = self.metadata.list(&FileQuery::for_owner(owner)).await?;

        let mut usage = SpaceUsage::empty();
        for record in records {
            let bucket = usage.bucket_mut(record.kind);
            bucket.size += record.size;
            if bucket.latest.map_or(true, |t| record.updated_at > t) {
                bucket.latest = Some(record.updated_at);
            }
            usage.used += record.size;
        }
        Ok(usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use sealbox_core::config::{StorageBackend, StorageConfig};
    use sealbox_crypto::MasterSecret;
    use sealbox_storage::{build_operator, JsonMetadataStore};

    fn service(password: &str) -> FileService<JsonMetadataStore> {
        let cfg = StorageConfig {
            backend: StorageBackend::Memory,
            ..StorageConfig::default()
        };
        let op = build_operator(&cfg).unwrap();
        FileService::new(
            EnvelopeCodec::new(MasterSecret::new(SecretString::from(password))),
            ObjectStore::new(op.clone()),
            JsonMetadataStore::new(op),
        )
    }

    fn request(name: &str, owner: &str) -> UploadRequest {
        UploadRequest {
            name: name.into(),
            mime: "text/plain".into(),
            owner: owner.into(),
        }
    }

    #[tokio::test]
    async fn test_upload_retrieve_roundtrip() {
        let svc = service("workflow-pw");
        let record = svc
            .upload(request("hello.txt", "alice"), b"hello world")
            .await
            .unwrap();

        assert_eq!(record.kind, FileKind::Document);
        assert_eq!(record.size, 11);
        assert!(!record.salt.is_empty());

        let (loaded, plaintext) = svc.retrieve(&record.id).await.unwrap();
        assert_eq!(plaintext, b"hello world");
        assert_eq!(loaded.name, "hello.txt");
    }

    #[tokio::test]
    async fn test_blob_store_holds_ciphertext_only() {
        let svc = service("workflow-pw");
        let plaintext = b"definitely secret payload".to_vec();
        let record = svc
            .upload(request("secret.bin", "alice"), &plaintext)
            .await
            .unwrap();

        let stored = svc.objects.get(&record.blob_id).await.unwrap();
        assert_ne!(stored, plaintext);
        // Padded to the next block boundary
        assert_eq!(stored.len() % 16, 0);
        assert!(stored.len() > plaintext.len());
    }

    #[tokio::test]
    async fn test_retrieve_with_wrong_password_fails() {
        let svc = service("right-pw");
        let record = svc
            .upload(request("note.txt", "alice"), b"attack at dawn, maybe")
            .await
            .unwrap();

        // Same stores, different codec password
        let wrong = FileService::new(
            EnvelopeCodec::new(MasterSecret::new(SecretString::from("wrong-pw"))),
            svc.objects.clone(),
            svc.metadata.clone(),
        );

        match wrong.retrieve(&record.id).await {
            Err(SealboxError::Crypto(CryptoError::DecryptionFailed)) => {}
            Err(other) => panic!("expected DecryptionFailed, got {other:?}"),
            Ok((_, garbage)) => assert_ne!(garbage, b"attack at dawn, maybe"),
        }
    }

    #[tokio::test]
    async fn test_retrieve_missing_salt_fails_before_decrypt() {
        let svc = service("workflow-pw");
        let mut record = svc
            .upload(request("note.txt", "alice"), b"payload")
            .await
            .unwrap();

        record.salt = String::new();
        svc.metadata.save(&record).await.unwrap();

        assert!(matches!(
            svc.retrieve(&record.id).await,
            Err(SealboxError::Crypto(CryptoError::MalformedRecord(_)))
        ));
    }

    #[tokio::test]
    async fn test_retrieve_unknown_id_is_not_found() {
        let svc = service("workflow-pw");
        assert!(matches!(
            svc.retrieve(&Uuid::new_v4()).await,
            Err(SealboxError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_record_and_blob() {
        let svc = service("workflow-pw");
        let record = svc
            .upload(request("gone.txt", "alice"), b"bye")
            .await
            .unwrap();
        let blob_id = record.blob_id;

        svc.delete(&record.id).await.unwrap();

        assert!(matches!(
            svc.retrieve(&record.id).await,
            Err(SealboxError::NotFound(_))
        ));
        assert!(matches!(
            svc.objects.get(&blob_id).await,
            Err(SealboxError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rename_keeps_extension() {
        let svc = service("workflow-pw");
        let record = svc
            .upload(request("draft v1.pdf", "alice"), b"pdf bytes")
            .await
            .unwrap();

        let renamed = svc.rename(&record.id, "final").await.unwrap();
        assert_eq!(renamed.name, "final.pdf");

        let (loaded, _) = svc.retrieve(&record.id).await.unwrap();
        assert_eq!(loaded.name, "final.pdf");
    }

    #[tokio::test]
    async fn test_share_makes_file_visible_to_recipient() {
        let svc = service("workflow-pw");
        let record = svc
            .upload(request("shared.txt", "alice"), b"for bob")
            .await
            .unwrap();

        svc.update_shared(&record.id, vec!["bob@example.com".into()])
            .await
            .unwrap();

        let query = FileQuery {
            shared_with: Some("bob@example.com".into()),
            ..FileQuery::default()
        };
        let visible = svc.list(&query).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, record.id);
    }

    #[tokio::test]
    async fn test_total_space_used_aggregates_by_kind() {
        let svc = service("workflow-pw");
        svc.upload(request("a.png", "alice"), &[0u8; 100])
            .await
            .unwrap();
        svc.upload(request("b.png", "alice"), &[0u8; 50])
            .await
            .unwrap();
        svc.upload(request("c.mp3", "alice"), &[0u8; 7])
            .await
            .unwrap();
        svc.upload(request("other-owner.png", "bob"), &[0u8; 999])
            .await
            .unwrap();

        let usage = svc.total_space_used("alice").await.unwrap();
        assert_eq!(usage.image.size, 150);
        assert_eq!(usage.audio.size, 7);
        assert_eq!(usage.used, 157);
        assert_eq!(usage.quota, SpaceUsage::DEFAULT_QUOTA);
        assert!(usage.image.latest.is_some());
        assert!(usage.video.latest.is_none());
    }

    #[tokio::test]
    async fn test_upload_with_empty_password_fails_cleanly() {
        let svc = service("");
        let result = svc.upload(request("x.txt", "alice"), b"data").await;
        assert!(matches!(
            result,
            Err(SealboxError::Crypto(CryptoError::MissingSecret))
        ));

        // Nothing was stored
        let listed = svc.list(&FileQuery::for_owner("alice")).await.unwrap();
        assert!(listed.is_empty());
    }
}
