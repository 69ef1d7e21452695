//! General utility helper functions
//!
//! This module contains validation helpers for Azure naming rules and
//! the storage account name generator.

use rand::Rng;
use uuid::Uuid;

use crate::error::{Result, SactlError};

/// Check if a string is a valid GUID/UUID
pub fn is_guid(s: &str) -> bool {
    Uuid::parse_str(s).is_ok()
}

/// Validate a storage account name.
///
/// Azure requires 3-24 characters, lowercase letters and digits only;
/// the namespace is global across the cloud.
pub fn validate_account_name(name: &str) -> Result<()> {
    if name.len() < 3 || name.len() > 24 {
        return Err(SactlError::invalid_argument(format!(
            "Storage account name '{}' must be 3-24 characters long",
            name
        )));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        return Err(SactlError::invalid_argument(format!(
            "Storage account name '{}' may contain only lowercase letters and numbers",
            name
        )));
    }

    Ok(())
}

/// Validate a resource group name.
///
/// Up to 90 characters of alphanumerics, periods, underscores, hyphens,
/// and parentheses; cannot end with a period.
pub fn validate_resource_group_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 90 {
        return Err(SactlError::invalid_argument(format!(
            "Resource group name '{}' must be 1-90 characters long",
            name
        )));
    }

    if name.ends_with('.') {
        return Err(SactlError::invalid_argument(format!(
            "Resource group name '{}' cannot end with a period",
            name
        )));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '(' | ')'))
    {
        return Err(SactlError::invalid_argument(format!(
            "Resource group name '{}' contains invalid characters",
            name
        )));
    }

    Ok(())
}

/// Generate a storage account name from a prefix plus a random hex
/// suffix, truncated to the 24-character limit
pub fn generate_account_name(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..8)
        .map(|_| {
            let v: u8 = rng.gen_range(0..16);
            char::from_digit(v as u32, 16).unwrap_or('0')
        })
        .collect();

    let mut name = format!("{}{}", prefix.to_lowercase(), suffix);
    name.retain(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    name.truncate(24);
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_names_are_valid_and_distinct() {
        let a = generate_account_name("storagesample");
        let b = generate_account_name("storagesample");
        assert!(validate_account_name(&a).is_ok());
        assert!(validate_account_name(&b).is_ok());
        assert_ne!(a, b);
        assert!(a.starts_with("storagesample"));
    }

    #[test]
    fn generator_truncates_long_prefixes() {
        let name = generate_account_name("averyveryverylongaccountprefix");
        assert!(name.len() <= 24);
        assert!(validate_account_name(&name).is_ok());
    }
}
