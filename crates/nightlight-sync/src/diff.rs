//! Works out which catalog maps are missing from the internal store

use nightlight_core::error::{NightlightError, Result};
use nightlight_core::models::identity::NamedVariant;
use nightlight_core::models::{Bounds, MapIdentity, MapType, SelectedDateFilter, SyncRequest};
use nightlight_core::ports::ExternalCatalog;
use std::collections::HashSet;

use crate::repository::InternalMapRepository;

/// Catalog maps inside the date selection that the internal store lacks.
///
/// Maps are compared by canonical key, so a stored copy from another provider
/// or with a different source URL still counts as present. The result keeps
/// the catalog's order.
pub async fn find_new_maps(
    internal: &InternalMapRepository,
    catalog: &dyn ExternalCatalog,
    bounds: Bounds,
    map_type: MapType,
    selected: &SelectedDateFilter,
) -> Result<Vec<MapIdentity>> {
    selected.validate()?;
    if bounds.is_unspecified() {
        return Err(NightlightError::InvalidIdentity {
            reason: "bounds is unspecified".to_string(),
        });
    }
    if map_type.is_unspecified() {
        return Err(NightlightError::InvalidIdentity {
            reason: "mapType is unspecified".to_string(),
        });
    }

    let stored = internal
        .list(catalog.provider(), bounds, map_type)
        .await
        .map_err(|e| NightlightError::store("internal inventory", e))?;
    let available = catalog
        .list_available(bounds, map_type)
        .await
        .map_err(|e| NightlightError::store("external catalog", e))?;

    let stored_keys: HashSet<String> = stored.iter().map(MapIdentity::canonical_key).collect();
    let new_maps: Vec<MapIdentity> = available
        .into_iter()
        .filter(|map| selected.matches(map))
        .filter(|map| !stored_keys.contains(&map.canonical_key()))
        .collect();

    tracing::debug!(
        bounds = %bounds,
        map_type = %map_type,
        stored = stored.len(),
        new = new_maps.len(),
        "Diffed catalog against internal store"
    );
    Ok(new_maps)
}

/// Enqueue a create request per map; returns how many were enqueued
pub async fn add_new_maps(internal: &InternalMapRepository, maps: &[MapIdentity]) -> usize {
    let mut enqueued = 0;
    for map in maps {
        match internal.create(map).await {
            Ok(()) => enqueued += 1,
            Err(e) => tracing::error!(map = %map, error = %e, "Failed to request map creation"),
        }
    }
    enqueued
}

/// Request every missing map the sync request selects
pub async fn sync_internal_with_external(
    internal: &InternalMapRepository,
    catalog: &dyn ExternalCatalog,
    request: &SyncRequest,
) -> Result<usize> {
    let new_maps = find_new_maps(
        internal,
        catalog,
        request.bounds,
        request.map_type,
        &request.selected_dates,
    )
    .await?;

    let enqueued = add_new_maps(internal, &new_maps).await;
    tracing::info!(
        bounds = %request.bounds,
        map_type = %request.map_type,
        requested = enqueued,
        "Sync finished"
    );
    Ok(enqueued)
}
