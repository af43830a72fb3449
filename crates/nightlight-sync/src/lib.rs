//! Nightlight Sync - Inventory, diff and publishing use cases
//!
//! This crate orchestrates the stores behind the ports defined in
//! `nightlight-core`: it builds inventories of stored maps, works out which
//! catalog maps are missing, and publishes or deletes maps across every store.

pub mod delete;
pub mod diff;
pub mod inventory;
pub mod manifest;
pub mod publish;
pub mod repository;
pub mod service;
pub mod steps;

pub use inventory::InventoryFilter;
pub use manifest::ManifestMaintainer;
pub use repository::InternalMapRepository;
pub use service::{BatchFailure, BatchReport, Orchestrator};
pub use steps::{FailurePolicy, StepFailure, StepPlan, StepReport};
