//! Authentication module for Azure Resource Manager
//!
//! This module provides credential acquisition for the ARM management
//! plane using DefaultAzureCredential or a client secret (service
//! principal) identity.

pub mod provider;

pub use provider::*;
