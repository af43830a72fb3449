//! Nightlight Store - Adapters for the storage and publishing ports
//!
//! `memory` backs tests and local experiments; `fs` keeps buckets, the
//! request queue, tilesets and the manifest under a single data directory.

pub mod credentials;
pub mod fs;
pub mod memory;

pub use credentials::TileHostCredentials;
