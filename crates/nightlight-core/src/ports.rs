//! Port trait definitions
//!
//! These traits define the interfaces that store, catalog and tile-host
//! adapters must implement.

pub mod catalog;
pub mod publishing;
pub mod storage;

pub use catalog::ExternalCatalog;
pub use publishing::{SecretsProvider, TileHost};
pub use storage::{ManifestDocument, ManifestStore, ObjectStore, RequestQueue};
