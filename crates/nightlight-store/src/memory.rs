//! In-memory adapters for development and testing.
//!
//! These implementations use `RwLock::unwrap()` intentionally. Lock poisoning
//! only occurs when another thread panicked while holding the lock, which is
//! an unrecoverable state. For anything persistent, use the `fs` adapters.

use async_trait::async_trait;
use nightlight_core::error::{NightlightError, Result};
use nightlight_core::models::{
    Bounds, CreateMapRequest, HostedTileset, MapIdentity, MapProvider, MapType,
};
use nightlight_core::ports::{
    ExternalCatalog, ManifestDocument, ManifestStore, ObjectStore, RequestQueue, SecretsProvider,
    TileHost,
};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, RwLock};

use crate::credentials::TileHostCredentials;

#[derive(Debug, Clone, Default)]
struct StoredObject {
    data: Vec<u8>,
    metadata: HashMap<String, String>,
}

/// In-memory implementation of ObjectStore
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    buckets: Arc<RwLock<HashMap<String, BTreeMap<String, StoredObject>>>>,
}

impl MemoryObjectStore {
    /// Create a new in-memory object store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object together with its metadata fields
    pub fn insert_with_metadata<K, V>(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        metadata: impl IntoIterator<Item = (K, V)>,
    ) where
        K: Into<String>,
        V: Into<String>,
    {
        let mut buckets = self.buckets.write().unwrap();
        buckets.entry(bucket.to_string()).or_default().insert(
            key.to_string(),
            StoredObject {
                data: data.to_vec(),
                metadata: metadata.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            },
        );
    }

    /// Whether an object exists
    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        let buckets = self.buckets.read().unwrap();
        buckets.get(bucket).is_some_and(|objects| objects.contains_key(key))
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list_keys(&self, bucket: &str) -> Result<Vec<String>> {
        let buckets = self.buckets.read().unwrap();
        Ok(buckets
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let buckets = self.buckets.read().unwrap();
        Ok(buckets.get(bucket).and_then(|objects| objects.get(key)).map(|o| o.data.clone()))
    }

    async fn put(&self, bucket: &str, key: &str, data: &[u8]) -> Result<()> {
        let mut buckets = self.buckets.write().unwrap();
        let object = buckets
            .entry(bucket.to_string())
            .or_default()
            .entry(key.to_string())
            .or_default();
        object.data = data.to_vec();
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        let mut buckets = self.buckets.write().unwrap();
        if let Some(objects) = buckets.get_mut(bucket) {
            objects.remove(key);
        }
        Ok(())
    }

    async fn get_metadata(&self, bucket: &str, key: &str, field: &str) -> Result<Option<String>> {
        let buckets = self.buckets.read().unwrap();
        Ok(buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .and_then(|o| o.metadata.get(field).cloned()))
    }
}

/// In-memory implementation of RequestQueue
#[derive(Debug, Clone, Default)]
pub struct MemoryRequestQueue {
    messages: Arc<RwLock<Vec<(String, CreateMapRequest)>>>,
}

impl MemoryRequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps requested on a queue, in enqueue order
    pub fn requested(&self, queue: &str) -> Vec<MapIdentity> {
        let messages = self.messages.read().unwrap();
        messages
            .iter()
            .filter(|(name, _)| name == queue)
            .map(|(_, request)| request.download_and_crop_raw_tif_request.map.clone())
            .collect()
    }
}

#[async_trait]
impl RequestQueue for MemoryRequestQueue {
    async fn publish_create_request(&self, queue: &str, map: &MapIdentity) -> Result<()> {
        let mut messages = self.messages.write().unwrap();
        messages.push((queue.to_string(), CreateMapRequest::new(map.clone())));
        Ok(())
    }
}

/// In-memory implementation of TileHost
#[derive(Debug, Clone)]
pub struct MemoryTileHost {
    credentials: TileHostCredentials,
    tilesets: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryTileHost {
    pub fn new(credentials: TileHostCredentials) -> Self {
        Self {
            credentials,
            tilesets: Arc::default(),
        }
    }

    /// Names the tilesets were uploaded under
    pub fn tileset_names(&self) -> Vec<String> {
        self.tilesets.read().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl TileHost for MemoryTileHost {
    async fn upload(&self, local_path: &Path, display_name: &str) -> Result<Option<HostedTileset>> {
        let data = tokio::fs::read(local_path).await?;
        self.tilesets.write().unwrap().insert(display_name.to_string(), data);

        let tileset_id = self.credentials.tileset_id(display_name);
        Ok(Some(HostedTileset {
            url: format!("tiles://{}", tileset_id),
            tileset_id,
        }))
    }

    async fn delete(&self, canonical_key: &str) -> Result<()> {
        self.tilesets.write().unwrap().remove(canonical_key);
        Ok(())
    }
}

/// In-memory implementation of ManifestStore with version checking
#[derive(Debug, Clone, Default)]
pub struct MemoryManifestStore {
    document: Arc<RwLock<Option<ManifestDocument>>>,
}

impl MemoryManifestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current raw document, if any
    pub fn snapshot(&self) -> Option<ManifestDocument> {
        self.document.read().unwrap().clone()
    }
}

#[async_trait]
impl ManifestStore for MemoryManifestStore {
    async fn get_document(&self) -> Result<Option<ManifestDocument>> {
        Ok(self.document.read().unwrap().clone())
    }

    async fn put_document(&self, bytes: &[u8], expected_version: Option<u64>) -> Result<u64> {
        let mut document = self.document.write().unwrap();
        let found = document.as_ref().map(|d| d.version);
        if found != expected_version {
            return Err(NightlightError::ManifestConflict {
                expected: expected_version,
                found,
            });
        }

        let version = found.map_or(1, |v| v + 1);
        *document = Some(ManifestDocument {
            bytes: bytes.to_vec(),
            version,
        });
        Ok(version)
    }
}

/// Fixed external catalog
#[derive(Debug, Clone)]
pub struct MemoryCatalog {
    provider: MapProvider,
    maps: Vec<MapIdentity>,
}

impl MemoryCatalog {
    pub fn new(provider: MapProvider, maps: Vec<MapIdentity>) -> Self {
        Self { provider, maps }
    }
}

#[async_trait]
impl ExternalCatalog for MemoryCatalog {
    async fn list_available(&self, bounds: Bounds, map_type: MapType) -> Result<Vec<MapIdentity>> {
        Ok(self
            .maps
            .iter()
            .filter(|m| m.bounds == bounds && m.map_type == map_type)
            .cloned()
            .collect())
    }

    fn provider(&self) -> MapProvider {
        self.provider
    }
}

/// In-memory implementation of SecretsProvider
#[derive(Debug, Clone, Default)]
pub struct MemorySecrets {
    secrets: HashMap<String, HashMap<String, String>>,
}

impl MemorySecrets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret<K, V>(mut self, key: &str, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.secrets.insert(
            key.to_string(),
            fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        );
        self
    }
}

#[async_trait]
impl SecretsProvider for MemorySecrets {
    async fn get_secret(&self, key: &str) -> Result<HashMap<String, String>> {
        self.secrets.get(key).cloned().ok_or_else(|| NightlightError::ConfigMissing {
            key: key.to_string(),
        })
    }
}
