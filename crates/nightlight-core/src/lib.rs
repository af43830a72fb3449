//! Nightlight Core - Map identity, ports, and configuration
//!
//! This crate contains the domain model, the storage-key codec and the port
//! definitions shared by the store adapters and the sync orchestrator.

pub mod codec;
pub mod config;
pub mod error;
pub mod models;
pub mod ports;

pub use error::{NightlightError, Result};
