//! Inventory of the maps held in an object store bucket

use nightlight_core::codec;
use nightlight_core::error::Result;
use nightlight_core::models::identity::NamedVariant;
use nightlight_core::models::{Bounds, MapIdentity, MapProvider, MapType};
use nightlight_core::ports::ObjectStore;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Wildcard filter over provider, bounds and map type
///
/// An `Unspecified` field matches every value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InventoryFilter {
    pub provider: MapProvider,
    pub bounds: Bounds,
    pub map_type: MapType,
}

impl InventoryFilter {
    /// Match everything
    pub fn any() -> Self {
        Self::default()
    }

    pub fn new(provider: MapProvider, bounds: Bounds, map_type: MapType) -> Self {
        Self {
            provider,
            bounds,
            map_type,
        }
    }

    pub fn matches(&self, map: &MapIdentity) -> bool {
        fn field<T: NamedVariant + PartialEq>(wanted: T, actual: T) -> bool {
            wanted.is_unspecified() || wanted == actual
        }

        field(self.provider, map.provider())
            && field(self.bounds, map.bounds)
            && field(self.map_type, map.map_type)
    }
}

/// List, decode and filter every map in `bucket`, sorted by date.
///
/// Keys that are not shaped like a storage key, or fail to decode, are
/// skipped. A missing source URL leaves the entry in place with an empty URL.
pub async fn list_internal(
    store: Arc<dyn ObjectStore>,
    bucket: &str,
    metadata_field: &str,
    filter: InventoryFilter,
) -> Result<Vec<MapIdentity>> {
    let keys = store.list_keys(bucket).await?;
    if keys.is_empty() {
        tracing::warn!(bucket, "Bucket is empty");
        return Ok(Vec::new());
    }

    let mut tasks = JoinSet::new();
    for key in keys {
        let store = Arc::clone(&store);
        let bucket = bucket.to_string();
        let metadata_field = metadata_field.to_string();

        tasks.spawn(async move { inspect_key(store, &bucket, &metadata_field, filter, key).await });
    }

    let mut maps = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Some(map)) => maps.push(map),
            Ok(None) => {}
            Err(e) => tracing::error!(bucket, error = %e, "Inventory task failed"),
        }
    }

    maps.sort_by_key(|map| map.date);
    tracing::debug!(bucket, count = maps.len(), "Inventory listed");
    Ok(maps)
}

async fn inspect_key(
    store: Arc<dyn ObjectStore>,
    bucket: &str,
    metadata_field: &str,
    filter: InventoryFilter,
    key: String,
) -> Option<MapIdentity> {
    if !codec::has_storage_key_shape(&key) {
        tracing::warn!(bucket, key = %key, "Skipping object that is not a map");
        return None;
    }

    let map = match codec::decode_storage_key(&key) {
        Ok(map) => map,
        Err(e) => {
            tracing::warn!(bucket, key = %key, error = %e, "Skipping undecodable key");
            return None;
        }
    };

    if !filter.matches(&map) {
        return None;
    }

    let url = match store.get_metadata(bucket, &key, metadata_field).await {
        Ok(Some(url)) if !url.is_empty() => url,
        Ok(_) => {
            tracing::warn!(bucket, key = %key, field = metadata_field, "Map has no source URL");
            String::new()
        }
        Err(e) => {
            tracing::warn!(bucket, key = %key, error = %e, "Failed to read source URL");
            String::new()
        }
    };

    Some(map.with_url(url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nightlight_core::models::Date;

    #[test]
    fn test_wildcard_filter() {
        let map = MapIdentity::new(
            MapProvider::Eogdata,
            Bounds::GazaAndAround,
            MapType::Daily,
            Date::new(2023, 10, 7),
        );

        assert!(InventoryFilter::any().matches(&map));
        assert!(InventoryFilter::new(MapProvider::Eogdata, Bounds::Unspecified, MapType::Daily)
            .matches(&map));
        assert!(!InventoryFilter::new(
            MapProvider::Unspecified,
            Bounds::UkraineAndAround,
            MapType::Unspecified
        )
        .matches(&map));
        assert!(
            !InventoryFilter::new(MapProvider::Unspecified, Bounds::Unspecified, MapType::Monthly)
                .matches(&map)
        );
    }
}
