//! Filesystem adapters
//!
//! Every external store is mapped onto a directory under a single data root:
//!
//! ```text
//! {root}/{bucket}/{key}                    objects
//! {root}/.metadata/{bucket}/{key}.json     object metadata
//! {root}/queues/{queue}.jsonl              enqueued create requests
//! {root}/tilesets/{tileset_id}.tif         published tilesets
//! ```

use async_trait::async_trait;
use nightlight_core::codec::MAP_EXTENSION;
use nightlight_core::error::{NightlightError, Result};
use nightlight_core::models::{
    Bounds, CreateMapRequest, HostedTileset, MapIdentity, MapProvider, MapType,
};
use nightlight_core::ports::{
    ExternalCatalog, ManifestDocument, ManifestStore, ObjectStore, RequestQueue, SecretsProvider,
    TileHost,
};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::credentials::TileHostCredentials;

const METADATA_DIR: &str = ".metadata";

fn io_error(store: &str, path: &Path, err: std::io::Error) -> NightlightError {
    NightlightError::store(store, format!("{}: {}", path.display(), err))
}

/// Read a file, treating a missing file as `None`
async fn read_optional(path: &Path) -> std::io::Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Remove a file, treating a missing file as success
async fn remove_optional(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Write through a sibling temp file so readers never see a partial document
async fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, data).await?;
    tokio::fs::rename(&tmp, path).await
}

/// Object store backed by one directory per bucket
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        Ok(self.root.join(checked_segment(bucket)?).join(checked_key(key)?))
    }

    fn metadata_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        let mut path = self
            .root
            .join(METADATA_DIR)
            .join(checked_segment(bucket)?)
            .join(checked_key(key)?)
            .into_os_string();
        path.push(".json");
        Ok(PathBuf::from(path))
    }

    /// Store an object together with its metadata fields
    pub async fn put_with_metadata(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        metadata: &HashMap<String, String>,
    ) -> Result<()> {
        self.put(bucket, key, data).await?;

        let path = self.metadata_path(bucket, key)?;
        let bytes = serde_json::to_vec_pretty(metadata)?;
        write_atomic(&path, &bytes)
            .await
            .map_err(|e| io_error("object store", &path, e))
    }
}

/// Reject keys that would escape the bucket directory
fn checked_key(key: &str) -> Result<&Path> {
    let path = Path::new(key);
    let escapes = key.is_empty()
        || path
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
    if escapes {
        return Err(NightlightError::store(
            "object store",
            format!("invalid object key '{}'", key),
        ));
    }
    Ok(path)
}

fn checked_segment(bucket: &str) -> Result<&str> {
    if bucket.is_empty() || bucket.contains('/') || bucket.starts_with('.') {
        return Err(NightlightError::store(
            "object store",
            format!("invalid bucket name '{}'", bucket),
        ));
    }
    Ok(bucket)
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn list_keys(&self, bucket: &str) -> Result<Vec<String>> {
        let bucket_dir = self.root.join(checked_segment(bucket)?);
        if !tokio::fs::try_exists(&bucket_dir)
            .await
            .map_err(|e| io_error("object store", &bucket_dir, e))?
        {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        let mut pending = vec![bucket_dir.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .map_err(|e| io_error("object store", &dir, e))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| io_error("object store", &dir, e))?
            {
                let path = entry.path();
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| io_error("object store", &path, e))?;
                if file_type.is_dir() {
                    pending.push(path);
                } else if let Ok(relative) = path.strip_prefix(&bucket_dir) {
                    let key: Vec<String> = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned())
                        .collect();
                    keys.push(key.join("/"));
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.object_path(bucket, key)?;
        read_optional(&path)
            .await
            .map_err(|e| io_error("object store", &path, e))
    }

    async fn put(&self, bucket: &str, key: &str, data: &[u8]) -> Result<()> {
        let path = self.object_path(bucket, key)?;
        write_atomic(&path, data)
            .await
            .map_err(|e| io_error("object store", &path, e))
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        let path = self.object_path(bucket, key)?;
        remove_optional(&path)
            .await
            .map_err(|e| io_error("object store", &path, e))?;

        let metadata = self.metadata_path(bucket, key)?;
        remove_optional(&metadata)
            .await
            .map_err(|e| io_error("object store", &metadata, e))
    }

    async fn get_metadata(&self, bucket: &str, key: &str, field: &str) -> Result<Option<String>> {
        let path = self.metadata_path(bucket, key)?;
        let Some(bytes) = read_optional(&path)
            .await
            .map_err(|e| io_error("object store", &path, e))?
        else {
            return Ok(None);
        };

        let fields: HashMap<String, String> = serde_json::from_slice(&bytes)?;
        Ok(fields.get(field).cloned())
    }
}

/// Request queue appending one JSON message per line
#[derive(Debug, Clone)]
pub struct FsRequestQueue {
    root: PathBuf,
}

impl FsRequestQueue {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn queue_path(&self, queue: &str) -> PathBuf {
        self.root.join("queues").join(format!("{}.jsonl", queue))
    }

    /// Read back every message on a queue
    pub async fn messages(&self, queue: &str) -> Result<Vec<CreateMapRequest>> {
        let path = self.queue_path(queue);
        let Some(bytes) = read_optional(&path)
            .await
            .map_err(|e| io_error("request queue", &path, e))?
        else {
            return Ok(Vec::new());
        };

        String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(NightlightError::from))
            .collect()
    }
}

#[async_trait]
impl RequestQueue for FsRequestQueue {
    async fn publish_create_request(&self, queue: &str, map: &MapIdentity) -> Result<()> {
        let path = self.queue_path(checked_segment(queue)?);
        let mut line = serde_json::to_vec(&CreateMapRequest::new(map.clone()))?;
        line.push(b'\n');

        let append = async {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .await?;
            file.write_all(&line).await?;
            file.sync_data().await
        };
        append.await.map_err(|e| io_error("request queue", &path, e))
    }
}

/// Manifest document stored next to a version counter file
///
/// Reads and writes within one process are serialized; the version check makes
/// concurrent writers from other processes observe a conflict rather than
/// overwrite each other in the common case.
#[derive(Debug)]
pub struct FsManifestStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FsManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn version_path(&self) -> PathBuf {
        let mut path = self.path.as_os_str().to_owned();
        path.push(".version");
        PathBuf::from(path)
    }

    async fn read_version(&self) -> Result<Option<u64>> {
        let path = self.version_path();
        let Some(bytes) = read_optional(&path)
            .await
            .map_err(|e| io_error("manifest", &path, e))?
        else {
            return Ok(None);
        };

        String::from_utf8_lossy(&bytes)
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| NightlightError::store("manifest", format!("corrupt version file: {}", e)))
    }
}

#[async_trait]
impl ManifestStore for FsManifestStore {
    async fn get_document(&self) -> Result<Option<ManifestDocument>> {
        let _guard = self.write_lock.lock().await;

        let Some(bytes) = read_optional(&self.path)
            .await
            .map_err(|e| io_error("manifest", &self.path, e))?
        else {
            return Ok(None);
        };

        // A document written before versioning existed counts as version 0
        let version = self.read_version().await?.unwrap_or(0);
        Ok(Some(ManifestDocument { bytes, version }))
    }

    async fn put_document(&self, bytes: &[u8], expected_version: Option<u64>) -> Result<u64> {
        let _guard = self.write_lock.lock().await;

        let exists = tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| io_error("manifest", &self.path, e))?;
        let found = if exists {
            Some(self.read_version().await?.unwrap_or(0))
        } else {
            None
        };

        if found != expected_version {
            return Err(NightlightError::ManifestConflict {
                expected: expected_version,
                found,
            });
        }

        // Bump the version before replacing the document so an interrupted
        // write still fails writers holding the old version.
        let version = found.map_or(1, |v| v + 1);
        let version_path = self.version_path();
        write_atomic(&version_path, version.to_string().as_bytes())
            .await
            .map_err(|e| io_error("manifest", &version_path, e))?;
        write_atomic(&self.path, bytes)
            .await
            .map_err(|e| io_error("manifest", &self.path, e))?;

        Ok(version)
    }
}

/// Tile host that "publishes" by copying files into a tilesets directory
#[derive(Debug, Clone)]
pub struct DirectoryTileHost {
    root: PathBuf,
    credentials: TileHostCredentials,
}

impl DirectoryTileHost {
    pub fn new(root: impl Into<PathBuf>, credentials: TileHostCredentials) -> Self {
        Self {
            root: root.into(),
            credentials,
        }
    }

    /// Build a tile host with credentials fetched from the secrets provider
    pub async fn from_secrets(
        root: impl Into<PathBuf>,
        secrets: &dyn SecretsProvider,
        key: &str,
    ) -> Result<Self> {
        let credentials = TileHostCredentials::from_secrets(secrets, key).await?;
        Ok(Self::new(root, credentials))
    }

    fn tileset_path(&self, display_name: &str) -> Result<PathBuf> {
        let name = checked_segment(display_name)?;
        Ok(self.root.join("tilesets").join(format!(
            "{}.{}",
            self.credentials.tileset_id(name),
            MAP_EXTENSION
        )))
    }
}

#[async_trait]
impl TileHost for DirectoryTileHost {
    async fn upload(&self, local_path: &Path, display_name: &str) -> Result<Option<HostedTileset>> {
        let target = self.tileset_path(display_name)?;
        let copy = async {
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::copy(local_path, &target).await
        };
        copy.await.map_err(|e| io_error("tile host", &target, e))?;

        let tileset_id = self.credentials.tileset_id(display_name);
        tracing::debug!(tileset = %tileset_id, path = %target.display(), "Tileset written");
        Ok(Some(HostedTileset {
            url: format!("tiles://{}", tileset_id),
            tileset_id,
        }))
    }

    async fn delete(&self, canonical_key: &str) -> Result<()> {
        let target = self.tileset_path(canonical_key)?;
        remove_optional(&target)
            .await
            .map_err(|e| io_error("tile host", &target, e))
    }
}

/// External catalog read from a JSON list of maps
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    path: PathBuf,
    provider: MapProvider,
}

impl JsonCatalog {
    pub fn new(path: impl Into<PathBuf>, provider: MapProvider) -> Self {
        Self {
            path: path.into(),
            provider,
        }
    }
}

#[async_trait]
impl ExternalCatalog for JsonCatalog {
    async fn list_available(&self, bounds: Bounds, map_type: MapType) -> Result<Vec<MapIdentity>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| io_error("catalog", &self.path, e))?;
        let maps: Vec<MapIdentity> = serde_json::from_slice(&bytes)
            .map_err(|e| NightlightError::store("catalog", e))?;

        Ok(maps
            .into_iter()
            .filter(|m| m.bounds == bounds && m.map_type == map_type)
            .filter(|m| m.provider() == self.provider)
            .collect())
    }

    fn provider(&self) -> MapProvider {
        self.provider
    }
}

/// Secrets read from environment variables holding JSON objects
///
/// The variable name is the secret key upper-cased with `-` replaced by `_`.
#[derive(Debug, Clone, Default)]
pub struct EnvSecretsProvider;

impl EnvSecretsProvider {
    pub fn variable_name(key: &str) -> String {
        key.to_uppercase().replace('-', "_")
    }
}

#[async_trait]
impl SecretsProvider for EnvSecretsProvider {
    async fn get_secret(&self, key: &str) -> Result<HashMap<String, String>> {
        let variable = Self::variable_name(key);
        let raw = std::env::var(&variable)
            .map_err(|_| NightlightError::ConfigMissing { key: variable.clone() })?;

        serde_json::from_str(&raw).map_err(|e| NightlightError::ConfigInvalid {
            key: variable,
            reason: e.to_string(),
        })
    }
}
