//! sactl - Azure Storage Account Lifecycle Tool
//!
//! A CLI tool for managing Azure storage accounts through the
//! Azure Resource Manager API: resource provider registration,
//! resource groups, account CRUD, and access key rotation.

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod storage;
pub mod utils;

// Re-export commonly used types
pub use error::{Result, SactlError};
