//! Storage account data models and types
//!
//! This module defines the data structures used for storage account
//! management: SKU and kind enumerations, account properties, resource
//! groups, access keys, and name availability results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use tabled::Tabled;

use crate::error::SactlError;

/// Display function for Option<String> in tables
fn display_option(opt: &Option<String>) -> String {
    match opt {
        Some(value) => value.clone(),
        None => "-".to_string(),
    }
}

/// Storage account SKU (redundancy/performance class)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountSku {
    #[serde(rename = "Standard_LRS")]
    StandardLrs,
    #[serde(rename = "Standard_GRS")]
    StandardGrs,
    #[serde(rename = "Standard_RAGRS")]
    StandardRagrs,
    #[serde(rename = "Standard_ZRS")]
    StandardZrs,
    #[serde(rename = "Standard_GZRS")]
    StandardGzrs,
    #[serde(rename = "Standard_RAGZRS")]
    StandardRagzrs,
    #[serde(rename = "Premium_LRS")]
    PremiumLrs,
    #[serde(rename = "Premium_ZRS")]
    PremiumZrs,
}

impl AccountSku {
    /// ARM wire name for this SKU
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountSku::StandardLrs => "Standard_LRS",
            AccountSku::StandardGrs => "Standard_GRS",
            AccountSku::StandardRagrs => "Standard_RAGRS",
            AccountSku::StandardZrs => "Standard_ZRS",
            AccountSku::StandardGzrs => "Standard_GZRS",
            AccountSku::StandardRagzrs => "Standard_RAGZRS",
            AccountSku::PremiumLrs => "Premium_LRS",
            AccountSku::PremiumZrs => "Premium_ZRS",
        }
    }
}

impl std::fmt::Display for AccountSku {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountSku {
    type Err = SactlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "standard_lrs" | "standardlrs" => Ok(AccountSku::StandardLrs),
            "standard_grs" | "standardgrs" => Ok(AccountSku::StandardGrs),
            "standard_ragrs" | "standardragrs" => Ok(AccountSku::StandardRagrs),
            "standard_zrs" | "standardzrs" => Ok(AccountSku::StandardZrs),
            "standard_gzrs" | "standardgzrs" => Ok(AccountSku::StandardGzrs),
            "standard_ragzrs" | "standardragzrs" => Ok(AccountSku::StandardRagzrs),
            "premium_lrs" | "premiumlrs" => Ok(AccountSku::PremiumLrs),
            "premium_zrs" | "premiumzrs" => Ok(AccountSku::PremiumZrs),
            _ => Err(SactlError::invalid_argument(format!(
                "Unknown storage account SKU: {}",
                s
            ))),
        }
    }
}

/// Storage account kind (capability category)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKind {
    Storage,
    StorageV2,
    BlobStorage,
    FileStorage,
    BlockBlobStorage,
}

impl AccountKind {
    /// ARM wire name for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Storage => "Storage",
            AccountKind::StorageV2 => "StorageV2",
            AccountKind::BlobStorage => "BlobStorage",
            AccountKind::FileStorage => "FileStorage",
            AccountKind::BlockBlobStorage => "BlockBlobStorage",
        }
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountKind {
    type Err = SactlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "storage" => Ok(AccountKind::Storage),
            "storagev2" => Ok(AccountKind::StorageV2),
            "blobstorage" => Ok(AccountKind::BlobStorage),
            "filestorage" => Ok(AccountKind::FileStorage),
            "blockblobstorage" => Ok(AccountKind::BlockBlobStorage),
            _ => Err(SactlError::invalid_argument(format!(
                "Unknown storage account kind: {}",
                s
            ))),
        }
    }
}

/// Azure storage account properties and metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageAccountProperties {
    pub id: String,
    pub name: String,
    pub resource_group: String,
    pub subscription_id: String,
    pub location: String,
    pub sku: AccountSku,
    pub kind: AccountKind,
    pub provisioning_state: String,
    pub creation_time: Option<DateTime<Utc>>,
    pub tags: HashMap<String, String>,
}

impl StorageAccountProperties {
    /// Convert to an account summary for list output
    pub fn to_summary(&self) -> AccountSummary {
        AccountSummary {
            name: self.name.clone(),
            resource_group: self.resource_group.clone(),
            location: self.location.clone(),
            sku: self.sku.to_string(),
            kind: self.kind.to_string(),
            provisioning_state: self.provisioning_state.clone(),
        }
    }
}

/// Storage account summary for list operations
#[derive(Debug, Clone, Serialize, Deserialize, Tabled)]
pub struct AccountSummary {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Resource Group")]
    pub resource_group: String,
    #[tabled(rename = "Location")]
    pub location: String,
    #[tabled(rename = "SKU")]
    pub sku: String,
    #[tabled(rename = "Kind")]
    pub kind: String,
    #[tabled(rename = "State")]
    pub provisioning_state: String,
}

/// Storage account creation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountCreateRequest {
    pub name: String,
    pub resource_group: String,
    pub location: String,
    pub sku: AccountSku,
    pub kind: AccountKind,
    pub tags: HashMap<String, String>,
}

/// Storage account update parameters.
///
/// Only the set fields are changed; everything else is carried over
/// from the live account so an update never clears attributes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountUpdateRequest {
    pub sku: Option<AccountSku>,
    pub tags: Option<HashMap<String, String>>,
}

/// A named storage account access key
#[derive(Debug, Clone, Serialize, Deserialize, Tabled)]
pub struct StorageAccountKey {
    #[tabled(rename = "Key")]
    pub key_name: String,
    #[tabled(skip)]
    pub value: String,
    #[tabled(rename = "Permissions", display_with = "display_option")]
    pub permissions: Option<String>,
}

/// Result of a storage account name availability check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameAvailability {
    pub name_available: bool,
    pub reason: Option<String>,
    pub message: Option<String>,
}

/// Resource group handle
#[derive(Debug, Clone, Serialize, Deserialize, Tabled)]
pub struct ResourceGroup {
    #[tabled(skip)]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Location")]
    pub location: String,
    #[tabled(rename = "State")]
    pub provisioning_state: String,
}

/// Registration state of the Microsoft.Storage resource provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRegistration {
    pub namespace: String,
    pub registration_state: String,
}

impl ProviderRegistration {
    pub fn is_registered(&self) -> bool {
        self.registration_state.eq_ignore_ascii_case("registered")
    }
}
