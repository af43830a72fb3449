use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Bounds, MapIdentity, MapProvider, MapType};

/// Port for the external source catalog maps are discovered from
#[async_trait]
pub trait ExternalCatalog: Send + Sync {
    /// List the maps the source currently offers for a region and granularity
    async fn list_available(&self, bounds: Bounds, map_type: MapType) -> Result<Vec<MapIdentity>>;

    /// Provider every listed map originates from
    fn provider(&self) -> MapProvider;
}
