//! Configuration management module
//!
//! This module handles configuration loading, validation, and persistence
//! from configuration files, environment variables, and default values.

pub mod settings;

pub use settings::*;
