//! Storage account management module
//!
//! This module contains the data models, the ARM-backed operations
//! layer, the CLI-facing manager facade, and the lifecycle orchestrator
//! that drives the full create-inspect-rotate-update-delete sequence.

pub mod lifecycle;
pub mod manager;
pub mod models;
pub mod operations;

pub use lifecycle::{LifecycleOrchestrator, LifecycleRequest, RunResult, Step};
pub use manager::StorageManager;
pub use models::*;
pub use operations::{AzureStorageOperations, StorageOperations};
