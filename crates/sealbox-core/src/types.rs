use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Coarse classification of a stored file, derived from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Document,
    Video,
    Audio,
    Other,
}

impl FileKind {
    /// Classify by file extension (lowercased, without the dot).
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "webp" | "svg" | "heic" => FileKind::Image,
            "pdf" | "doc" | "docx" | "txt" | "md" | "rtf" | "odt" | "xls" | "xlsx" | "csv"
            | "ppt" | "pptx" | "html" | "json" | "xml" => FileKind::Document,
            "mp4" | "mov" | "avi" | "mkv" | "webm" | "flv" | "wmv" => FileKind::Video,
            "mp3" | "wav" | "flac" | "ogg" | "aac" | "m4a" => FileKind::Audio,
            _ => FileKind::Other,
        }
    }

    /// Classify a full file name, falling back to `Other` when there is no
    /// extension.
    pub fn from_name(name: &str) -> Self {
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => Self::from_extension(ext),
            _ => FileKind::Other,
        }
    }
}

/// Metadata document stored alongside each encrypted blob.
///
/// `salt` holds the base64 salt‖iv record produced at encryption time: it is
/// written once at upload, required for every decrypt, and deleted with the
/// record. Everything else is plain catalog data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: Uuid,
    pub name: String,
    pub extension: String,
    pub kind: FileKind,
    pub mime: String,
    /// Plaintext size in bytes (the blob holds the padded ciphertext)
    pub size: u64,
    pub owner: String,
    /// Emails the file is shared with
    pub shared_with: Vec<String>,
    /// Key of the ciphertext in the object store
    pub blob_id: Uuid,
    /// base64(salt ‖ iv) for this file's envelope
    pub salt: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sort key for file listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Name,
    Size,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Query over the metadata store: files an account can see (owned or shared
/// with), optionally narrowed by kind and name substring.
#[derive(Debug, Clone, Default)]
pub struct FileQuery {
    /// Match records owned by this account
    pub owner: Option<String>,
    /// Match records shared with this email
    pub shared_with: Option<String>,
    /// Restrict to these kinds (empty = all)
    pub kinds: Vec<FileKind>,
    /// Case-insensitive substring match on the file name
    pub search: Option<String>,
    pub sort_key: Option<SortKey>,
    pub sort_order: Option<SortOrder>,
    pub limit: Option<usize>,
}

impl FileQuery {
    pub fn for_owner(owner: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            ..Self::default()
        }
    }

    /// Whether a record is visible under this query's owner/shared filters.
    pub fn matches(&self, record: &FileRecord) -> bool {
        let visible = match (&self.owner, &self.shared_with) {
            (None, None) => true,
            (owner, shared) => {
                owner.as_deref() == Some(record.owner.as_str())
                    || shared
                        .as_ref()
                        .is_some_and(|email| record.shared_with.iter().any(|s| s == email))
            }
        };
        if !visible {
            return false;
        }
        if !self.kinds.is_empty() && !self.kinds.contains(&record.kind) {
            return false;
        }
        if let Some(search) = &self.search {
            if !record
                .name
                .to_ascii_lowercase()
                .contains(&search.to_ascii_lowercase())
            {
                return false;
            }
        }
        true
    }
}

/// Per-kind usage bucket for the storage dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KindUsage {
    pub size: u64,
    pub latest: Option<DateTime<Utc>>,
}

/// Aggregate space usage for one account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceUsage {
    pub image: KindUsage,
    pub document: KindUsage,
    pub video: KindUsage,
    pub audio: KindUsage,
    pub other: KindUsage,
    /// Total bytes used across all kinds
    pub used: u64,
    /// Account quota in bytes
    pub quota: u64,
}

impl SpaceUsage {
    /// 2 GiB per-account quota
    pub const DEFAULT_QUOTA: u64 = 2 * 1024 * 1024 * 1024;

    pub fn empty() -> Self {
        Self {
            image: KindUsage::default(),
            document: KindUsage::default(),
            video: KindUsage::default(),
            audio: KindUsage::default(),
            other: KindUsage::default(),
            used: 0,
            quota: Self::DEFAULT_QUOTA,
        }
    }

    pub fn bucket_mut(&mut self, kind: FileKind) -> &mut KindUsage {
        match kind {
            FileKind::Image => &mut self.image,
            FileKind::Document => &mut self.document,
            FileKind::Video => &mut self.video,
            FileKind::Audio => &mut self.audio,
            FileKind::Other => &mut self.other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, owner: &str) -> FileRecord {
        let now = Utc::now();
        FileRecord {
            id: Uuid::new_v4(),
            name: name.into(),
            extension: name.rsplit_once('.').map(|(_, e)| e).unwrap_or("").into(),
            kind: FileKind::from_name(name),
            mime: "application/octet-stream".into(),
            size: 10,
            owner: owner.into(),
            shared_with: vec![],
            blob_id: Uuid::new_v4(),
            salt: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(FileKind::from_extension("JPG"), FileKind::Image);
        assert_eq!(FileKind::from_extension("pdf"), FileKind::Document);
        assert_eq!(FileKind::from_extension("mkv"), FileKind::Video);
        assert_eq!(FileKind::from_extension("flac"), FileKind::Audio);
        assert_eq!(FileKind::from_extension("xyz"), FileKind::Other);
    }

    #[test]
    fn test_kind_from_name() {
        assert_eq!(FileKind::from_name("report.pdf"), FileKind::Document);
        assert_eq!(FileKind::from_name("noextension"), FileKind::Other);
        assert_eq!(FileKind::from_name(".dotfile"), FileKind::Other);
    }

    #[test]
    fn test_query_owner_match() {
        let r = record("a.txt", "alice");
        assert!(FileQuery::for_owner("alice").matches(&r));
        assert!(!FileQuery::for_owner("bob").matches(&r));
    }

    #[test]
    fn test_query_shared_with_match() {
        let mut r = record("a.txt", "alice");
        r.shared_with.push("bob@example.com".into());

        let q = FileQuery {
            shared_with: Some("bob@example.com".into()),
            ..FileQuery::default()
        };
        assert!(q.matches(&r));

        // Owner OR shared-with: either side grants visibility
        let q = FileQuery {
            owner: Some("carol".into()),
            shared_with: Some("bob@example.com".into()),
            ..FileQuery::default()
        };
        assert!(q.matches(&r));
    }

    #[test]
    fn test_query_kind_and_search_filters() {
        let r = record("Vacation Photo.png", "alice");

        let q = FileQuery {
            owner: Some("alice".into()),
            kinds: vec![FileKind::Image],
            search: Some("photo".into()),
            ..FileQuery::default()
        };
        assert!(q.matches(&r));

        let q = FileQuery {
            owner: Some("alice".into()),
            kinds: vec![FileKind::Video],
            ..FileQuery::default()
        };
        assert!(!q.matches(&r));
    }

    #[test]
    fn test_file_record_json_roundtrip() {
        let r = record("a.txt", "alice");
        let json = serde_json::to_string(&r).unwrap();
        let parsed: FileRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, r.id);
        assert_eq!(parsed.kind, r.kind);
        assert_eq!(parsed.name, r.name);
    }
}
