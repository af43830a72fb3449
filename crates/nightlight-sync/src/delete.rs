//! Best-effort removal of a map from every store

use futures::future::BoxFuture;
use nightlight_core::error::Result;
use nightlight_core::models::MapIdentity;
use nightlight_core::ports::TileHost;
use std::sync::Arc;

use crate::manifest::ManifestMaintainer;
use crate::repository::InternalMapRepository;
use crate::steps::{FailurePolicy, StepPlan, StepReport};

pub struct DeleteRun {
    tile_host: Arc<dyn TileHost>,
    manifest: Arc<ManifestMaintainer>,
    processed: Arc<InternalMapRepository>,
    raw: Arc<InternalMapRepository>,
    identity: MapIdentity,
}

fn plan() -> StepPlan<DeleteRun> {
    StepPlan::new("delete", FailurePolicy::ContinueOnFailure)
        .step("tile host", from_tile_host)
        .step("manifest", from_manifest)
        .step("processed store", from_processed)
        .step("raw store", from_raw)
}

/// Remove a map from the tile host, manifest, processed and raw stores.
///
/// Every store is attempted even when an earlier one fails; failures are
/// logged and returned in the report rather than as an error.
pub async fn delete_everywhere(
    tile_host: Arc<dyn TileHost>,
    manifest: Arc<ManifestMaintainer>,
    processed: Arc<InternalMapRepository>,
    raw: Arc<InternalMapRepository>,
    identity: MapIdentity,
) -> StepReport {
    let mut run = DeleteRun {
        tile_host,
        manifest,
        processed,
        raw,
        identity,
    };

    let report = plan().run(&mut run).await;
    tracing::info!(map = %run.identity, outcome = %report, "Delete finished");
    report
}

fn from_tile_host(run: &mut DeleteRun) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move { run.tile_host.delete(&run.identity.canonical_key()).await })
}

fn from_manifest(run: &mut DeleteRun) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move { run.manifest.delete(&run.identity).await })
}

fn from_processed(run: &mut DeleteRun) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move { run.processed.delete(&run.identity).await })
}

fn from_raw(run: &mut DeleteRun) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move { run.raw.delete(&run.identity).await })
}
