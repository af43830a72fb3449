//! Error types for Nightlight

use std::fmt::Display;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NightlightError {
    // Identity errors
    #[error("Invalid map identity: {reason}")]
    InvalidIdentity { reason: String },

    #[error("Malformed storage key '{key}': {reason}")]
    MalformedKey { key: String, reason: String },

    #[error("Invalid date filter: {reason}")]
    InvalidDateFilter { reason: String },

    // Publish errors
    #[error("Failed to download {key}: {reason}")]
    DownloadFailed { key: String, reason: String },

    #[error("Download of {key} reported success but returned no asset")]
    NilAsset { key: String },

    #[error("Tile host failed for {key}: {reason}")]
    TileHostFailed { key: String, reason: String },

    #[error("Tile host reported success for {key} but returned no tileset")]
    NilPublishResult { key: String },

    #[error("Failed to write manifest entry {key}: {reason}")]
    ManifestWriteFailed { key: String, reason: String },

    #[error("Manifest version conflict: expected {expected:?}, found {found:?}")]
    ManifestConflict {
        expected: Option<u64>,
        found: Option<u64>,
    },

    // Store errors
    #[error("{store} unavailable: {reason}")]
    StoreUnavailable { store: String, reason: String },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl NightlightError {
    /// Generic collaborator failure
    pub fn store(store: impl Into<String>, reason: impl Display) -> Self {
        Self::StoreUnavailable {
            store: store.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error is an optimistic-concurrency conflict that may be retried
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ManifestConflict { .. })
    }
}

impl From<serde_json::Error> for NightlightError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NightlightError>;
