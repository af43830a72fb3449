use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::identity::{Bounds, MapIdentity, MapType};
use crate::error::{NightlightError, Result};

/// Years at or below this value are rejected by the date filter
pub const MIN_SELECTABLE_YEAR: i32 = 2010;

/// Months and years a sync run is restricted to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedDateFilter {
    pub months: BTreeSet<u32>,
    pub years: BTreeSet<i32>,
}

impl SelectedDateFilter {
    pub fn new(
        months: impl IntoIterator<Item = u32>,
        years: impl IntoIterator<Item = i32>,
    ) -> Self {
        Self {
            months: months.into_iter().collect(),
            years: years.into_iter().collect(),
        }
    }

    /// Check the filter has a usable shape
    pub fn validate(&self) -> Result<()> {
        if self.months.is_empty() {
            return Err(invalid("no months were selected"));
        }
        if let Some(month) = self.months.iter().find(|m| !(1..=12).contains(*m)) {
            return Err(invalid(format!("month {} is outside 1-12", month)));
        }
        if self.years.is_empty() {
            return Err(invalid("no years were selected"));
        }
        if let Some(year) = self.years.iter().find(|y| **y <= MIN_SELECTABLE_YEAR) {
            return Err(invalid(format!(
                "year {} must be after {}",
                year, MIN_SELECTABLE_YEAR
            )));
        }
        Ok(())
    }

    /// Whether a map's date falls inside the selection
    pub fn matches(&self, map: &MapIdentity) -> bool {
        self.months.contains(&map.date.month) && self.years.contains(&map.date.year)
    }
}

fn invalid(reason: impl Into<String>) -> NightlightError {
    NightlightError::InvalidDateFilter {
        reason: reason.into(),
    }
}

/// Input of a sync run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub bounds: Bounds,
    pub map_type: MapType,
    pub selected_dates: SelectedDateFilter,
}

/// Message enqueued to ask the downstream processor to fetch and crop a raw map
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMapRequest {
    pub download_and_crop_raw_tif_request: DownloadAndCropRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadAndCropRequest {
    pub map: MapIdentity,
}

impl CreateMapRequest {
    pub fn new(map: MapIdentity) -> Self {
        Self {
            download_and_crop_raw_tif_request: DownloadAndCropRequest { map },
        }
    }
}
