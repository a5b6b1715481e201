//! sealbox-storage: adapters around the external stores
//!
//! The encryption core treats both stores as opaque collaborators: the object
//! store holds ciphertext blobs keyed by id, the metadata store holds JSON
//! file records (including the salt‖iv attribute). Both ride on the same
//! OpenDAL operator, so tests run against the memory service and deployments
//! pick S3 or a local directory in config.

pub mod metadata;
pub mod object;
pub mod operator;

pub use metadata::{JsonMetadataStore, MetadataStore};
pub use object::ObjectStore;
pub use operator::build_operator;
