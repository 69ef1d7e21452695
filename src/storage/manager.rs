//! Storage management facade
//!
//! This module provides a high-level interface over the storage
//! operations trait for the CLI subcommands, with console output for
//! interactive use.

use std::sync::Arc;

use super::models::{
    AccountCreateRequest, AccountSummary, AccountUpdateRequest, NameAvailability,
    ProviderRegistration, ResourceGroup, StorageAccountKey, StorageAccountProperties,
};
use super::operations::StorageOperations;
use crate::error::{Result, SactlError};
use crate::utils::format::{DisplayUtils, OutputFormat, TableFormatter};
use crate::utils::helpers::validate_account_name;

/// High-level storage account manager
pub struct StorageManager {
    storage_ops: Arc<dyn StorageOperations>,
    display_utils: DisplayUtils,
    no_color: bool,
}

impl StorageManager {
    /// Create a new storage manager
    pub fn new(storage_ops: Arc<dyn StorageOperations>, no_color: bool) -> Self {
        Self {
            storage_ops,
            display_utils: DisplayUtils::new(no_color),
            no_color,
        }
    }

    /// Register the Microsoft.Storage resource provider
    pub async fn register_provider(&self) -> Result<ProviderRegistration> {
        self.display_utils
            .print_info("Registering the Microsoft.Storage resource provider...")?;

        let registration = self.storage_ops.register_provider().await?;

        self.display_utils.print_success(&format!(
            "Provider '{}' registration state: {}",
            registration.namespace, registration.registration_state
        ))?;

        Ok(registration)
    }

    /// Create or update a resource group
    pub async fn upsert_resource_group(
        &self,
        name: &str,
        location: &str,
    ) -> Result<ResourceGroup> {
        self.display_utils
            .print_info(&format!("Creating resource group '{name}'..."))?;

        let group = self.storage_ops.upsert_resource_group(name, location).await?;

        self.display_utils.print_success(&format!(
            "Resource group '{}' ready in {}",
            group.name, group.location
        ))?;

        Ok(group)
    }

    /// Check whether an account name is globally available
    pub async fn check_name(&self, name: &str) -> Result<NameAvailability> {
        validate_account_name(name)?;
        let availability = self.storage_ops.check_name_availability(name).await?;

        if availability.name_available {
            self.display_utils
                .print_success(&format!("Name '{name}' is available"))?;
        } else {
            self.display_utils.print_warning(&format!(
                "Name '{}' is not available: {}",
                name,
                availability.message.as_deref().unwrap_or("already taken")
            ))?;
        }

        Ok(availability)
    }

    /// Create a storage account after validating the name locally and
    /// checking global availability
    pub async fn create_account(
        &self,
        request: &AccountCreateRequest,
    ) -> Result<StorageAccountProperties> {
        validate_account_name(&request.name)?;

        let availability = self
            .storage_ops
            .check_name_availability(&request.name)
            .await?;
        if !availability.name_available {
            return Err(SactlError::name_unavailable(
                request.name.clone(),
                availability
                    .message
                    .unwrap_or_else(|| "name already taken".to_string()),
            ));
        }

        self.display_utils
            .print_info(&format!("Creating storage account '{}'...", request.name))?;

        let account = self.storage_ops.upsert_account(request).await?;

        self.display_utils.print_success(&format!(
            "Storage account '{}' created in {} ({}, {})",
            account.name, account.location, account.sku, account.kind
        ))?;

        Ok(account)
    }

    /// Get account properties without displaying them
    pub async fn get_account_properties(
        &self,
        resource_group: &str,
        account_name: &str,
    ) -> Result<StorageAccountProperties> {
        self.storage_ops
            .get_account(resource_group, account_name)
            .await
    }

    /// List accounts with formatted output
    pub async fn list_accounts_formatted(
        &self,
        resource_group: Option<&str>,
        output_format: OutputFormat,
    ) -> Result<Vec<AccountSummary>> {
        let accounts = self.storage_ops.list_accounts(resource_group).await?;

        if accounts.is_empty() {
            self.display_utils.print_info("No storage accounts found.")?;
            return Ok(accounts);
        }

        let formatter = TableFormatter::new(output_format, self.no_color);
        let table_output = formatter.format_table(&accounts)?;
        println!("{table_output}");

        Ok(accounts)
    }

    /// Update mutable account attributes in place
    pub async fn update_account(
        &self,
        resource_group: &str,
        account_name: &str,
        request: &AccountUpdateRequest,
    ) -> Result<StorageAccountProperties> {
        self.display_utils
            .print_info(&format!("Updating storage account '{account_name}'..."))?;

        let account = self
            .storage_ops
            .update_account(resource_group, account_name, request)
            .await?;

        self.display_utils.print_success(&format!(
            "Storage account '{}' updated ({})",
            account.name, account.sku
        ))?;

        Ok(account)
    }

    /// List access keys; values are masked unless reveal is set
    pub async fn list_keys_formatted(
        &self,
        resource_group: &str,
        account_name: &str,
        reveal: bool,
        output_format: OutputFormat,
    ) -> Result<Vec<StorageAccountKey>> {
        let keys = self
            .storage_ops
            .list_keys(resource_group, account_name)
            .await?;

        self.print_keys(&keys, reveal, output_format)?;

        Ok(keys)
    }

    /// Regenerate one named key and display the refreshed set
    pub async fn regenerate_key(
        &self,
        resource_group: &str,
        account_name: &str,
        key_name: &str,
        reveal: bool,
        output_format: OutputFormat,
    ) -> Result<Vec<StorageAccountKey>> {
        self.display_utils.print_info(&format!(
            "Regenerating '{key_name}' for account '{account_name}'..."
        ))?;

        let keys = self
            .storage_ops
            .regenerate_key(resource_group, account_name, key_name)
            .await?;

        self.display_utils
            .print_success(&format!("Key '{key_name}' regenerated"))?;
        self.print_keys(&keys, reveal, output_format)?;

        Ok(keys)
    }

    /// Delete an account, verifying existence first unless forced
    pub async fn delete_account_safe(
        &self,
        resource_group: &str,
        account_name: &str,
        force: bool,
    ) -> Result<()> {
        if !force {
            let account = self
                .storage_ops
                .get_account(resource_group, account_name)
                .await?;
            self.display_utils.print_warning(&format!(
                "This will delete storage account '{}' in resource group '{}' ({}, {}). \
                 All data in the account becomes unrecoverable.",
                account.name, account.resource_group, account.sku, account.kind
            ))?;
        }

        self.storage_ops
            .delete_account(resource_group, account_name)
            .await?;

        self.display_utils
            .print_success(&format!("Storage account '{account_name}' deleted"))?;

        Ok(())
    }

    /// Display full account details
    pub fn display_account_details(&self, account: &StorageAccountProperties) -> Result<()> {
        self.display_utils
            .print_header(&format!("Storage Account: {}", account.name))?;
        self.display_utils
            .print_key_value("Resource Group", &account.resource_group)?;
        self.display_utils
            .print_key_value("Location", &account.location)?;
        self.display_utils
            .print_key_value("SKU", account.sku.as_str())?;
        self.display_utils
            .print_key_value("Kind", account.kind.as_str())?;
        self.display_utils
            .print_key_value("State", &account.provisioning_state)?;
        if let Some(created) = &account.creation_time {
            self.display_utils
                .print_key_value("Created", &created.format("%Y-%m-%d %H:%M").to_string())?;
        }
        if !account.tags.is_empty() {
            let mut pairs: Vec<String> = account
                .tags
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            pairs.sort();
            self.display_utils
                .print_key_value("Tags", &pairs.join(", "))?;
        }
        Ok(())
    }

    fn print_keys(
        &self,
        keys: &[StorageAccountKey],
        reveal: bool,
        output_format: OutputFormat,
    ) -> Result<()> {
        let display: Vec<StorageAccountKey> = keys
            .iter()
            .map(|k| StorageAccountKey {
                key_name: k.key_name.clone(),
                value: if reveal {
                    k.value.clone()
                } else {
                    mask_key(&k.value)
                },
                permissions: k.permissions.clone(),
            })
            .collect();

        match output_format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&display)?);
            }
            OutputFormat::Table => {
                for key in &display {
                    self.display_utils
                        .print_key_value(&key.key_name, &key.value)?;
                }
            }
        }
        Ok(())
    }
}

/// Mask a key value for display, keeping a short prefix.
///
/// Counts characters, not bytes, so multi-byte values never split on a
/// char boundary.
fn mask_key(value: &str) -> String {
    if value.chars().count() <= 4 {
        return "****".to_string();
    }
    let prefix: String = value.chars().take(4).collect();
    format!("{prefix}****")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_key_keeps_short_prefix() {
        assert_eq!(mask_key("abcdefgh"), "abcd****");
        assert_eq!(mask_key("abc"), "****");
    }

    #[test]
    fn mask_key_handles_multibyte_values() {
        assert_eq!(mask_key("käßéz123"), "käßé****");
        assert_eq!(mask_key("käß"), "****");
    }
}
