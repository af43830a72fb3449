use nightlight_core::models::{ManifestRecord, MapIdentity};
use serde::Serialize;
use std::collections::BTreeMap;
use tabled::Tabled;

/// Output for list-raw and list-processed
#[derive(Debug, Serialize)]
pub struct ListMapsOutput {
    pub bucket: String,
    pub maps: Vec<MapIdentity>,
}

/// Output for list-published
#[derive(Debug, Serialize)]
pub struct ListPublishedOutput {
    pub published: Vec<ManifestRecord>,
}

/// Output for publish
#[derive(Debug, Serialize)]
pub struct PublishOutput {
    pub key: String,
    pub url: String,
    pub map: MapIdentity,
}

/// Output for publish-many
#[derive(Debug, Serialize)]
pub struct PublishManyOutput {
    pub total: usize,
    pub published: Vec<PublishOutput>,
    pub failed: Vec<FailureOutput>,
}

#[derive(Debug, Serialize)]
pub struct FailureOutput {
    pub key: String,
    pub error: String,
}

/// Output for delete
#[derive(Debug, Serialize)]
pub struct DeleteOutput {
    pub key: String,
    pub completed: Vec<String>,
    pub failed: Vec<StepFailureOutput>,
}

#[derive(Debug, Serialize)]
pub struct StepFailureOutput {
    pub store: String,
    pub error: String,
}

/// Output for sync
#[derive(Debug, Serialize)]
pub struct SyncOutput {
    pub dry_run: bool,
    pub requested: usize,
    pub maps: Vec<MapIdentity>,
}

/// Output for config
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub values: BTreeMap<String, ConfigEntry>,
}

#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub value: String,
    pub source: String,
}

/// Table row for one stored map
#[derive(Debug, Tabled)]
pub struct MapRow {
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Map Type")]
    pub map_type: String,
    #[tabled(rename = "Bounds")]
    pub bounds: String,
    #[tabled(rename = "Provider")]
    pub provider: String,
}

impl From<&MapIdentity> for MapRow {
    fn from(map: &MapIdentity) -> Self {
        Self {
            date: map.date.to_string(),
            map_type: map.map_type.to_string(),
            bounds: map.bounds.to_string(),
            provider: map.provider().to_string(),
        }
    }
}

/// Table row for one manifest entry
#[derive(Debug, Tabled)]
pub struct PublishedRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "URL")]
    pub url: String,
}

impl From<&ManifestRecord> for PublishedRow {
    fn from(record: &ManifestRecord) -> Self {
        Self {
            key: record.key.clone(),
            date: record.display_name.clone(),
            url: record.url.clone(),
        }
    }
}
