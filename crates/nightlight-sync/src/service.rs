use futures::future::join_all;
use nightlight_core::error::{NightlightError, Result};
use nightlight_core::models::{Bounds, MapIdentity, MapProvider, MapType, PublishedEntry, SyncRequest};
use nightlight_core::ports::{ExternalCatalog, TileHost};
use std::sync::Arc;

use crate::delete::delete_everywhere;
use crate::diff;
use crate::manifest::ManifestMaintainer;
use crate::publish::publish;
use crate::repository::InternalMapRepository;
use crate::steps::StepReport;

/// A map that failed to publish
#[derive(Debug)]
pub struct BatchFailure {
    pub map: MapIdentity,
    pub error: NightlightError,
}

/// Outcome of publishing several maps
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<PublishedEntry>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Entry point for every map operation
pub struct Orchestrator {
    catalog: Arc<dyn ExternalCatalog>,
    raw: Arc<InternalMapRepository>,
    processed: Arc<InternalMapRepository>,
    manifest: Arc<ManifestMaintainer>,
    tile_host: Option<Arc<dyn TileHost>>,
}

impl Orchestrator {
    pub fn new(
        catalog: Arc<dyn ExternalCatalog>,
        raw: InternalMapRepository,
        processed: InternalMapRepository,
        manifest: ManifestMaintainer,
    ) -> Self {
        Self {
            catalog,
            raw: Arc::new(raw),
            processed: Arc::new(processed),
            manifest: Arc::new(manifest),
            tile_host: None,
        }
    }

    /// Attach the tile host used by publish and delete
    pub fn with_tile_host(mut self, tile_host: Arc<dyn TileHost>) -> Self {
        self.tile_host = Some(tile_host);
        self
    }

    fn tile_host(&self) -> Result<Arc<dyn TileHost>> {
        self.tile_host
            .clone()
            .ok_or_else(|| NightlightError::ConfigMissing {
                key: "tile host".to_string(),
            })
    }

    /// Raw maps from the catalog's provider
    pub async fn list_raw(&self) -> Result<Vec<MapIdentity>> {
        self.raw
            .list(self.catalog.provider(), Bounds::Unspecified, MapType::Unspecified)
            .await
    }

    /// Every processed map
    pub async fn list_processed(&self) -> Result<Vec<MapIdentity>> {
        self.processed
            .list(MapProvider::Unspecified, Bounds::Unspecified, MapType::Unspecified)
            .await
    }

    /// Manifest entries in display order
    pub async fn list_published(&self) -> Result<Vec<PublishedEntry>> {
        self.manifest.list().await
    }

    pub async fn publish_map(&self, map: &MapIdentity) -> Result<PublishedEntry> {
        let tile_host = self.tile_host()?;
        publish(
            Arc::clone(&self.processed),
            tile_host,
            Arc::clone(&self.manifest),
            map.clone(),
        )
        .await
    }

    /// Publish maps concurrently, collecting every failure
    pub async fn publish_maps(&self, maps: Vec<MapIdentity>) -> BatchReport {
        let outcomes = join_all(maps.iter().map(|map| self.publish_map(map))).await;

        let mut report = BatchReport::default();
        for (map, outcome) in maps.into_iter().zip(outcomes) {
            match outcome {
                Ok(entry) => report.succeeded.push(entry),
                Err(error) => {
                    tracing::error!(map = %map, error = %error, "Failed to publish map");
                    report.failed.push(BatchFailure { map, error });
                }
            }
        }

        tracing::info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "Batch publish finished"
        );
        report
    }

    /// Remove a map everywhere; store failures are reported, not raised
    pub async fn delete_map(&self, map: &MapIdentity) -> Result<StepReport> {
        let tile_host = self.tile_host()?;
        Ok(delete_everywhere(
            tile_host,
            Arc::clone(&self.manifest),
            Arc::clone(&self.processed),
            Arc::clone(&self.raw),
            map.clone(),
        )
        .await)
    }

    /// Request creation of every selected catalog map missing internally
    pub async fn sync(&self, request: &SyncRequest) -> Result<usize> {
        diff::sync_internal_with_external(&self.raw, self.catalog.as_ref(), request).await
    }

    /// Catalog maps the sync request would create, without enqueueing them
    pub async fn find_new_maps(&self, request: &SyncRequest) -> Result<Vec<MapIdentity>> {
        diff::find_new_maps(
            &self.raw,
            self.catalog.as_ref(),
            request.bounds,
            request.map_type,
            &request.selected_dates,
        )
        .await
    }
}
