//! Opaque blob store: put(bytes) → id, get(id) → bytes
//!
//! Stores ciphertext only and never inspects content. Keys are random UUIDs
//! under a `blobs/` prefix, minted at put time.

use opendal::{ErrorKind, Operator};
use uuid::Uuid;

use sealbox_core::{SealboxError, SealboxResult};

const BLOB_PREFIX: &str = "blobs";

#[derive(Debug, Clone)]
pub struct ObjectStore {
    op: Operator,
}

impl ObjectStore {
    pub fn new(op: Operator) -> Self {
        Self { op }
    }

    fn path(id: &Uuid) -> String {
        format!("{BLOB_PREFIX}/{id}")
    }

    /// Store a blob under a freshly minted id.
    pub async fn put(&self, bytes: Vec<u8>) -> SealboxResult<Uuid> {
        let id = Uuid::new_v4();
        let len = bytes.len();
        self.op
            .write(&Self::path(&id), bytes)
            .await
            .map_err(|e| SealboxError::Storage(format!("writing blob {id}: {e}")))?;
        tracing::debug!(blob_id = %id, bytes = len, "stored blob");
        Ok(id)
    }

    pub async fn get(&self, id: &Uuid) -> SealboxResult<Vec<u8>> {
        let buf = self.op.read(&Self::path(id)).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                SealboxError::NotFound(format!("blob {id}"))
            } else {
                SealboxError::Storage(format!("reading blob {id}: {e}"))
            }
        })?;
        Ok(buf.to_vec())
    }

    pub async fn delete(&self, id: &Uuid) -> SealboxResult<()> {
        self.op
            .delete(&Self::path(id))
            .await
            .map_err(|e| SealboxError::Storage(format!("deleting blob {id}: {e}")))?;
        tracing::debug!(blob_id = %id, "deleted blob");
        Ok(())
    }
}
