//! sealbox-files: the upload/retrieval workflow
//!
//! Control flow:
//!   upload    → EnvelopeCodec::encrypt → ObjectStore::put(ciphertext)
//!               → MetadataStore::save(record with salt‖iv)
//!   retrieval → MetadataStore::load → ObjectStore::get(ciphertext)
//!               → EnvelopeCodec::decrypt
//!
//! Plus the passthrough catalog operations of the dashboard service layer:
//! list, rename, share, delete, and per-account space usage.

pub mod service;

pub use service::{FileService, UploadRequest};
