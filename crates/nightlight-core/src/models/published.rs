use serde::{Deserialize, Serialize};

use super::identity::MapIdentity;
use crate::codec;

/// One published map and the URL the front end loads it from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedEntry {
    pub identity: MapIdentity,
    pub url: String,
}

impl PublishedEntry {
    pub fn new(identity: MapIdentity, url: impl Into<String>) -> Self {
        Self {
            identity,
            url: url.into(),
        }
    }

    pub fn canonical_key(&self) -> String {
        self.identity.canonical_key()
    }
}

/// A tileset created on the tile host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostedTileset {
    /// Host-side identifier of the tileset
    pub tileset_id: String,

    /// Durable URL the front end can load
    pub url: String,
}

/// Manifest row as stored in the published document
///
/// `key` and `display_name` are derived from the map but persisted so the
/// front end does not need to recompute them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestRecord {
    pub key: String,
    pub display_name: String,
    pub url: String,
    pub map: MapIdentity,
}

impl From<&PublishedEntry> for ManifestRecord {
    fn from(entry: &PublishedEntry) -> Self {
        Self {
            key: entry.canonical_key(),
            display_name: codec::display_name(&entry.identity.date),
            url: entry.url.clone(),
            map: entry.identity.clone(),
        }
    }
}

impl From<ManifestRecord> for PublishedEntry {
    fn from(record: ManifestRecord) -> Self {
        Self {
            identity: record.map,
            url: record.url,
        }
    }
}
