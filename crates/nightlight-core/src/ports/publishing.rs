use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;
use crate::models::HostedTileset;

/// Port for the service hosting published tilesets
#[async_trait]
pub trait TileHost: Send + Sync {
    /// Upload a local map file under a display name
    ///
    /// `Ok(None)` means the host accepted the request but produced no tileset.
    async fn upload(&self, local_path: &Path, display_name: &str) -> Result<Option<HostedTileset>>;

    /// Remove the tileset published under a canonical key
    async fn delete(&self, canonical_key: &str) -> Result<()>;
}

/// Port for retrieving structured credentials
#[async_trait]
pub trait SecretsProvider: Send + Sync {
    async fn get_secret(&self, key: &str) -> Result<HashMap<String, String>>;
}
