pub mod identity;
pub mod published;
pub mod request;

pub use identity::{Bounds, Date, LocalAsset, MapIdentity, MapProvider, MapSource, MapType};
pub use published::{HostedTileset, ManifestRecord, PublishedEntry};
pub use request::{CreateMapRequest, SelectedDateFilter, SyncRequest, MIN_SELECTABLE_YEAR};
