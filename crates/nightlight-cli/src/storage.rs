use anyhow::Result;
use nightlight_core::config::LayeredConfig;
use nightlight_core::models::MapProvider;
use nightlight_store::fs::{
    DirectoryTileHost, EnvSecretsProvider, FsManifestStore, FsObjectStore, FsRequestQueue,
    JsonCatalog,
};
use nightlight_sync::{InternalMapRepository, ManifestMaintainer, Orchestrator};
use std::sync::Arc;

use crate::errors;

/// Provider the catalog file lists maps for
const CATALOG_PROVIDER: MapProvider = MapProvider::Eogdata;

/// Wire the filesystem adapters under the configured data root.
///
/// The tile host needs credentials, so it is only built for commands that
/// publish or delete.
pub async fn orchestrator(config: &LayeredConfig, with_tile_host: bool) -> Result<Orchestrator> {
    let root = config.data_root.value.clone();
    let objects = Arc::new(FsObjectStore::new(&root));
    let queue = Arc::new(FsRequestQueue::new(&root));

    let repository = |bucket: &str| {
        InternalMapRepository::new(objects.clone(), queue.clone(), bucket)
            .with_metadata_field(config.source_url_key.value.clone())
            .with_create_queue(config.create_queue.value.clone())
            .with_write_dir(config.write_dir.value.clone())
    };

    let manifest_store = FsManifestStore::new(root.join("manifest").join(&config.manifest_key.value));
    let manifest = ManifestMaintainer::new(Arc::new(manifest_store))
        .with_max_retries(config.manifest_max_retries.value);

    let orchestrator = Orchestrator::new(
        Arc::new(JsonCatalog::new(config.catalog_file(), CATALOG_PROVIDER)),
        repository(&config.raw_bucket.value),
        repository(&config.processed_bucket.value),
        manifest,
    );

    if !with_tile_host {
        return Ok(orchestrator);
    }

    let secrets_key = &config.secrets_key.value;
    let tile_host = DirectoryTileHost::from_secrets(&root, &EnvSecretsProvider, secrets_key)
        .await
        .map_err(|e| errors::tile_host_unavailable(secrets_key, &e))?;

    Ok(orchestrator.with_tile_host(Arc::new(tile_host)))
}
