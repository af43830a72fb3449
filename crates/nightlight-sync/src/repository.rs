use nightlight_core::codec;
use nightlight_core::error::Result;
use nightlight_core::models::{Bounds, LocalAsset, MapIdentity, MapProvider, MapType};
use nightlight_core::ports::{ObjectStore, RequestQueue};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::inventory::{self, InventoryFilter};

/// Maps held in one bucket of the internal object store
///
/// The raw and processed stores are both instances of this type; only the
/// raw store's create requests are consumed downstream.
pub struct InternalMapRepository {
    objects: Arc<dyn ObjectStore>,
    queue: Arc<dyn RequestQueue>,
    bucket: String,
    metadata_field: String,
    create_queue: String,
    write_dir: PathBuf,
}

impl InternalMapRepository {
    /// Create a repository over `bucket`
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        queue: Arc<dyn RequestQueue>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            objects,
            queue,
            bucket: bucket.into(),
            metadata_field: "source-url".to_string(),
            create_queue: String::new(),
            write_dir: std::env::temp_dir(),
        }
    }

    /// Set the metadata field holding each map's source URL
    pub fn with_metadata_field(mut self, field: impl Into<String>) -> Self {
        self.metadata_field = field.into();
        self
    }

    /// Set the queue create requests are sent to
    pub fn with_create_queue(mut self, queue: impl Into<String>) -> Self {
        self.create_queue = queue.into();
        self
    }

    /// Set the directory downloads are written into
    pub fn with_write_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.write_dir = dir.into();
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// List the maps matching a wildcard filter, sorted by date
    pub async fn list(
        &self,
        provider: MapProvider,
        bounds: Bounds,
        map_type: MapType,
    ) -> Result<Vec<MapIdentity>> {
        inventory::list_internal(
            Arc::clone(&self.objects),
            &self.bucket,
            &self.metadata_field,
            InventoryFilter::new(provider, bounds, map_type),
        )
        .await
    }

    /// Copy a map into a fresh temp file; `None` if it is not stored
    pub async fn download(&self, map: &MapIdentity) -> Result<Option<LocalAsset>> {
        let key = codec::encode_storage_key(map)?;
        let Some(data) = self.objects.get(&self.bucket, &key).await? else {
            return Ok(None);
        };

        tokio::fs::create_dir_all(&self.write_dir).await?;
        let file_path = self
            .write_dir
            .join(format!("{}.{}", Uuid::new_v4(), codec::MAP_EXTENSION));
        tokio::fs::write(&file_path, &data).await?;

        tracing::debug!(key = %key, path = %file_path.display(), "Map downloaded");
        Ok(Some(LocalAsset {
            file_path,
            identity: map.clone(),
        }))
    }

    /// Ask the downstream processor to create this map.
    ///
    /// Success means the request was enqueued, not that the map exists yet.
    pub async fn create(&self, map: &MapIdentity) -> Result<()> {
        map.ensure_concrete()?;
        self.queue
            .publish_create_request(&self.create_queue, map)
            .await?;
        tracing::debug!(map = %map, queue = %self.create_queue, "Create request enqueued");
        Ok(())
    }

    /// Remove a map; removing an absent map succeeds
    pub async fn delete(&self, map: &MapIdentity) -> Result<()> {
        let key = codec::encode_storage_key(map)?;
        self.objects.delete(&self.bucket, &key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nightlight_core::models::Date;
    use nightlight_store::memory::{MemoryObjectStore, MemoryRequestQueue};
    use tempfile::TempDir;

    fn map() -> MapIdentity {
        MapIdentity::new(
            MapProvider::Eogdata,
            Bounds::UkraineAndAround,
            MapType::Monthly,
            Date::new(2021, 1, 1),
        )
    }

    #[tokio::test]
    async fn test_download_writes_temp_file() {
        let dir = TempDir::new().unwrap();
        let objects = MemoryObjectStore::new();
        objects.insert_with_metadata(
            "processed",
            &codec::encode_storage_key(&map()).unwrap(),
            b"tif",
            Vec::<(String, String)>::new(),
        );

        let repo = InternalMapRepository::new(
            Arc::new(objects),
            Arc::new(MemoryRequestQueue::new()),
            "processed",
        )
        .with_write_dir(dir.path());

        let asset = repo.download(&map()).await.unwrap().unwrap();
        assert!(asset.file_path.starts_with(dir.path()));
        assert_eq!(asset.file_path.extension().unwrap(), "tif");
        assert_eq!(std::fs::read(&asset.file_path).unwrap(), b"tif");
    }

    #[tokio::test]
    async fn test_download_absent_map() {
        let repo = InternalMapRepository::new(
            Arc::new(MemoryObjectStore::new()),
            Arc::new(MemoryRequestQueue::new()),
            "processed",
        );
        assert!(repo.download(&map()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_enqueues_request() {
        let queue = MemoryRequestQueue::new();
        let repo = InternalMapRepository::new(
            Arc::new(MemoryObjectStore::new()),
            Arc::new(queue.clone()),
            "raw",
        )
        .with_create_queue("create");

        repo.create(&map()).await.unwrap();
        assert_eq!(queue.requested("create"), vec![map()]);
    }
}
