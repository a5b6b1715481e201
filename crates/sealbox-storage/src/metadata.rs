//! Metadata store: one JSON document per file record
//!
//! The original deployment kept file documents in a hosted document database;
//! the adapter keeps that collaborator generic. Records live as JSON under a
//! `meta/` prefix on the same operator family as the blobs, and queries are
//! evaluated in memory over the scanned prefix.

use opendal::{ErrorKind, Operator};
use uuid::Uuid;

use sealbox_core::types::{FileQuery, FileRecord, SortKey, SortOrder};
use sealbox_core::{SealboxError, SealboxResult};

const META_PREFIX: &str = "meta";

/// Store of file metadata documents, keyed by file id.
///
/// `save` doubles as update (documents are overwritten whole); `load` of a
/// missing id is `NotFound`, never a default record.
pub trait MetadataStore: Send + Sync {
    fn save(&self, record: &FileRecord) -> impl std::future::Future<Output = SealboxResult<()>> + Send;
    fn load(&self, id: &Uuid) -> impl std::future::Future<Output = SealboxResult<FileRecord>> + Send;
    fn delete(&self, id: &Uuid) -> impl std::future::Future<Output = SealboxResult<()>> + Send;
    fn list(&self, query: &FileQuery) -> impl std::future::Future<Output = SealboxResult<Vec<FileRecord>>> + Send;
}

#[derive(Debug, Clone)]
pub struct JsonMetadataStore {
    op: Operator,
}

impl JsonMetadataStore {
    pub fn new(op: Operator) -> Self {
        Self { op }
    }

    fn path(id: &Uuid) -> String {
        format!("{META_PREFIX}/{id}.json")
    }
}

impl MetadataStore for JsonMetadataStore {
    async fn save(&self, record: &FileRecord) -> SealboxResult<()> {
        let bytes = serde_json::to_vec(record)?;
        self.op
            .write(&Self::path(&record.id), bytes)
            .await
            .map_err(|e| SealboxError::Storage(format!("writing record {}: {e}", record.id)))?;
        tracing::debug!(file_id = %record.id, name = %record.name, "saved file record");
        Ok(())
    }

    async fn load(&self, id: &Uuid) -> SealboxResult<FileRecord> {
        let buf = self.op.read(&Self::path(id)).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                SealboxError::NotFound(format!("file record {id}"))
            } else {
                SealboxError::Storage(format!("reading record {id}: {e}"))
            }
        })?;
        Ok(serde_json::from_slice(&buf.to_vec())?)
    }

    async fn delete(&self, id: &Uuid) -> SealboxResult<()> {
        self.op
            .delete(&Self::path(id))
            .await
            .map_err(|e| SealboxError::Storage(format!("deleting record {id}: {e}")))?;
        tracing::debug!(file_id = %id, "deleted file record");
        Ok(())
    }

    async fn list(&self, query: &FileQuery) -> SealboxResult<Vec<FileRecord>> {
        let entries = self
            .op
            .list(&format!("{META_PREFIX}/"))
            .await
            .map_err(|e| SealboxError::Storage(format!("listing records: {e}")))?;

        let mut records = Vec::new();
        for entry in entries {
            if !entry.path().ends_with(".json") {
                continue;
            }
            let buf = self
                .op
                .read(entry.path())
                .await
                .map_err(|e| SealboxError::Storage(format!("reading {}: {e}", entry.path())))?;
            let record: FileRecord = serde_json::from_slice(&buf.to_vec())?;
            if query.matches(&record) {
                records.push(record);
            }
        }

        sort_records(&mut records, query);
        if let Some(limit) = query.limit {
            records.truncate(limit);
        }
        Ok(records)
    }
}

/// Newest-first by default, matching the dashboard's default ordering.
fn sort_records(records: &mut [FileRecord], query: &FileQuery) {
    let key = query.sort_key.unwrap_or(SortKey::CreatedAt);
    let order = query.sort_order.unwrap_or(match key {
        SortKey::CreatedAt => SortOrder::Desc,
        _ => SortOrder::Asc,
    });

    records.sort_by(|a, b| {
        let ord = match key {
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::Size => a.size.cmp(&b.size),
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}
