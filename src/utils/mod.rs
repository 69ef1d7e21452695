//! Shared utilities
//!
//! Helpers for validation and name generation, HTTP client setup and
//! network error classification, retry with backoff, and console
//! output formatting.

pub mod format;
pub mod helpers;
pub mod network;
pub mod retry;
