//! Publish pipeline: processed store -> tile host -> manifest

use futures::future::BoxFuture;
use nightlight_core::error::{NightlightError, Result};
use nightlight_core::models::{LocalAsset, MapIdentity, PublishedEntry};
use nightlight_core::ports::TileHost;
use std::sync::Arc;

use crate::manifest::ManifestMaintainer;
use crate::repository::InternalMapRepository;
use crate::steps::{FailurePolicy, StepPlan};

/// State carried between publish steps
pub struct PublishRun {
    processed: Arc<InternalMapRepository>,
    tile_host: Arc<dyn TileHost>,
    manifest: Arc<ManifestMaintainer>,
    identity: MapIdentity,
    key: String,
    asset: Option<LocalAsset>,
    published: Option<PublishedEntry>,
}

fn plan() -> StepPlan<PublishRun> {
    StepPlan::new("publish", FailurePolicy::StopOnFirstFailure)
        .step("download", download)
        .step("upload", upload)
        .step("manifest", record)
}

/// Publish one processed map and record it in the manifest.
///
/// Steps after the first failure are skipped and nothing is rolled back. The
/// downloaded temp file is removed whatever the outcome.
pub async fn publish(
    processed: Arc<InternalMapRepository>,
    tile_host: Arc<dyn TileHost>,
    manifest: Arc<ManifestMaintainer>,
    identity: MapIdentity,
) -> Result<PublishedEntry> {
    identity.ensure_concrete()?;

    let mut run = PublishRun {
        key: identity.canonical_key(),
        processed,
        tile_host,
        manifest,
        identity,
        asset: None,
        published: None,
    };

    let report = plan().run(&mut run).await;
    if let Some(asset) = run.asset.take() {
        remove_temp_file(&asset).await;
    }
    report.into_result()?;

    run.published
        .ok_or(NightlightError::NilPublishResult { key: run.key })
}

fn download(run: &mut PublishRun) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let asset = run
            .processed
            .download(&run.identity)
            .await
            .map_err(|e| NightlightError::DownloadFailed {
                key: run.key.clone(),
                reason: e.to_string(),
            })?
            .ok_or_else(|| NightlightError::NilAsset {
                key: run.key.clone(),
            })?;

        run.asset = Some(asset);
        Ok(())
    })
}

fn upload(run: &mut PublishRun) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let asset = run.asset.as_ref().ok_or_else(|| NightlightError::NilAsset {
            key: run.key.clone(),
        })?;

        let tileset = run
            .tile_host
            .upload(&asset.file_path, &run.key)
            .await
            .map_err(|e| NightlightError::TileHostFailed {
                key: run.key.clone(),
                reason: e.to_string(),
            })?
            .ok_or_else(|| NightlightError::NilPublishResult {
                key: run.key.clone(),
            })?;

        tracing::info!(key = %run.key, tileset = %tileset.tileset_id, "Map uploaded");
        run.published = Some(PublishedEntry::new(run.identity.clone(), tileset.url));
        Ok(())
    })
}

fn record(run: &mut PublishRun) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let entry = run.published.clone().ok_or_else(|| NightlightError::NilPublishResult {
            key: run.key.clone(),
        })?;

        run.manifest
            .upsert(entry)
            .await
            .map_err(|e| NightlightError::ManifestWriteFailed {
                key: run.key.clone(),
                reason: e.to_string(),
            })
    })
}

async fn remove_temp_file(asset: &LocalAsset) {
    if let Err(e) = tokio::fs::remove_file(&asset.file_path).await {
        tracing::warn!(
            path = %asset.file_path.display(),
            error = %e,
            "Failed to remove temp file"
        );
    }
}
