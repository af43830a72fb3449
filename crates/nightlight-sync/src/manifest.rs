//! Maintains the published-maps manifest
//!
//! The manifest is a single JSON array of [`ManifestRecord`]s ordered by
//! (year, month). Every change is a read-modify-write of the whole document.
//! Writers sharing a maintainer take turns; writers in other processes are
//! caught by the store's version check and retried on conflict.

use nightlight_core::error::Result;
use nightlight_core::models::{ManifestRecord, MapIdentity, PublishedEntry};
use nightlight_core::ports::ManifestStore;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Default number of retries after a version conflict
pub const DEFAULT_MAX_RETRIES: u32 = 5;

pub struct ManifestMaintainer {
    store: Arc<dyn ManifestStore>,
    max_retries: u32,
    write_lock: Mutex<()>,
}

impl ManifestMaintainer {
    pub fn new(store: Arc<dyn ManifestStore>) -> Self {
        Self {
            store,
            max_retries: DEFAULT_MAX_RETRIES,
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Published entries in manifest order; empty if never written
    pub async fn list(&self) -> Result<Vec<PublishedEntry>> {
        let (entries, _) = self.read().await?;
        Ok(entries)
    }

    /// Insert an entry, or replace the one with the same canonical key
    pub async fn upsert(&self, entry: PublishedEntry) -> Result<()> {
        let key = entry.canonical_key();
        self.modify(&key, |entries| {
            match entries.iter_mut().find(|e| e.canonical_key() == key) {
                Some(existing) => *existing = entry.clone(),
                None => entries.push(entry.clone()),
            }
            sort_entries(entries);
            true
        })
        .await
    }

    /// Remove the entry for a map; absent entries are not an error
    pub async fn delete(&self, map: &MapIdentity) -> Result<()> {
        let key = map.canonical_key();
        self.modify(&key, |entries| {
            let before = entries.len();
            entries.retain(|e| e.canonical_key() != key);
            entries.len() != before
        })
        .await
    }

    async fn read(&self) -> Result<(Vec<PublishedEntry>, Option<u64>)> {
        let Some(document) = self.store.get_document().await? else {
            return Ok((Vec::new(), None));
        };

        let records: Vec<ManifestRecord> = serde_json::from_slice(&document.bytes)?;
        let entries = records.into_iter().map(PublishedEntry::from).collect();
        Ok((entries, Some(document.version)))
    }

    /// Apply `change` and write the result back if it reports a change.
    ///
    /// The whole cycle is repeated when the store reports a conflict.
    async fn modify<F>(&self, key: &str, change: F) -> Result<()>
    where
        F: Fn(&mut Vec<PublishedEntry>) -> bool,
    {
        let _guard = self.write_lock.lock().await;

        let mut attempt = 0;
        loop {
            let (mut entries, version) = self.read().await?;
            if !change(&mut entries) {
                tracing::debug!(key, "Manifest unchanged");
                return Ok(());
            }

            let records: Vec<ManifestRecord> = entries.iter().map(ManifestRecord::from).collect();
            let bytes = serde_json::to_vec_pretty(&records)?;

            match self.store.put_document(&bytes, version).await {
                Ok(new_version) => {
                    tracing::debug!(key, version = new_version, "Manifest written");
                    return Ok(());
                }
                Err(e) if e.is_conflict() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(key, attempt, "Manifest changed concurrently, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Stable sort by (year, month); the day does not affect order
fn sort_entries(entries: &mut [PublishedEntry]) {
    entries.sort_by_key(|e| (e.identity.date.year, e.identity.date.month));
}
