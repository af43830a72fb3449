use async_trait::async_trait;

use crate::error::Result;
use crate::models::MapIdentity;

/// Port for bucketed object storage holding raw and processed maps
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List every object key in a bucket
    async fn list_keys(&self, bucket: &str) -> Result<Vec<String>>;

    /// Fetch an object; `None` if it does not exist
    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store an object, replacing any previous content
    async fn put(&self, bucket: &str, key: &str, data: &[u8]) -> Result<()>;

    /// Delete an object. Deleting an absent object succeeds.
    async fn delete(&self, bucket: &str, key: &str) -> Result<()>;

    /// Read one metadata field attached to an object
    async fn get_metadata(&self, bucket: &str, key: &str, field: &str) -> Result<Option<String>>;
}

/// Port for the queue that asks downstream workers to create raw maps
#[async_trait]
pub trait RequestQueue: Send + Sync {
    /// Durably enqueue a create request. Delivery is the consumer's concern.
    async fn publish_create_request(&self, queue: &str, map: &MapIdentity) -> Result<()>;
}

/// A stored manifest document and the version it was read at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDocument {
    pub bytes: Vec<u8>,
    pub version: u64,
}

/// Port for the single document listing published maps
#[async_trait]
pub trait ManifestStore: Send + Sync {
    /// Read the document; `None` if it has never been written
    async fn get_document(&self) -> Result<Option<ManifestDocument>>;

    /// Replace the document if it is still at `expected_version`
    /// (`None` = must not exist yet). Returns the new version.
    ///
    /// Fails with `ManifestConflict` when another writer got there first.
    async fn put_document(&self, bytes: &[u8], expected_version: Option<u64>) -> Result<u64>;
}
