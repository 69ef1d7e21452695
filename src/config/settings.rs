//! Configuration settings management
//!
//! This module handles loading configuration from multiple sources,
//! validation, and persistence.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use zeroize::Zeroizing;

use crate::error::{Result, SactlError};
use crate::storage::models::{AccountKind, AccountSku};
use crate::utils::helpers::{generate_account_name, is_guid};

/// Resolved sactl configuration.
///
/// Precedence: CLI arguments > environment variables > config file >
/// defaults. The client secret is zeroized on drop and never written
/// back to disk.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub debug: bool,
    pub subscription_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing, default)]
    pub client_secret: Option<Zeroizing<String>>,
    /// Credential selection: "auto", "default", or "clientsecret"
    pub credential_type: String,
    pub resource_group: String,
    /// Storage account name; generated per run when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    pub location: String,
    pub sku: AccountSku,
    pub kind: AccountKind,
    pub tags: HashMap<String, String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("debug", &self.debug)
            .field("subscription_id", &self.subscription_id)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .field("credential_type", &self.credential_type)
            .field("resource_group", &self.resource_group)
            .field("account_name", &self.account_name)
            .field("location", &self.location)
            .field("sku", &self.sku)
            .field("kind", &self.kind)
            .field("tags", &self.tags)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            subscription_id: String::new(),
            tenant_id: None,
            client_id: None,
            client_secret: None,
            credential_type: "auto".to_string(),
            resource_group: "TestResourceGroup".to_string(),
            account_name: None,
            location: "westus".to_string(),
            sku: AccountSku::StandardGrs,
            kind: AccountKind::StorageV2,
            tags: HashMap::new(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.subscription_id.is_empty() {
            return Err(SactlError::config("Subscription ID is required"));
        }

        if !is_guid(&self.subscription_id) {
            return Err(SactlError::config(format!(
                "Subscription ID '{}' is not a valid GUID",
                self.subscription_id
            )));
        }

        if self.resource_group.is_empty() {
            return Err(SactlError::config("Resource group is required"));
        }

        Ok(())
    }

    /// True when a full service principal identity is configured
    pub fn has_service_principal(&self) -> bool {
        self.tenant_id.is_some() && self.client_id.is_some() && self.client_secret.is_some()
    }

    /// Borrow the client secret out of its zeroizing wrapper
    pub fn client_secret_value(&self) -> Option<String> {
        self.client_secret.as_ref().map(|s| s.as_str().to_string())
    }

    /// Resolve the storage account name, generating one when unset.
    ///
    /// Account names are globally unique across Azure, so the generated
    /// form carries a random suffix.
    pub fn resolve_account_name(&self) -> String {
        match &self.account_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => generate_account_name("storagesample"),
        }
    }

    pub fn get_config_path() -> Result<PathBuf> {
        // XDG Base Directory layout on Linux and macOS
        #[cfg(any(target_os = "linux", target_os = "macos"))]
        {
            use std::env;
            let config_dir = if let Ok(xdg_config_home) = env::var("XDG_CONFIG_HOME") {
                PathBuf::from(xdg_config_home)
            } else {
                let home_dir = env::var("HOME")
                    .map_err(|_| SactlError::config("HOME environment variable not set"))?;
                PathBuf::from(home_dir).join(".config")
            };
            Ok(config_dir.join("sactl").join("sactl.toml"))
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            let config_dir = dirs::config_dir()
                .ok_or_else(|| SactlError::config("Unable to determine config directory"))?;
            Ok(config_dir.join("sactl").join("sactl.toml"))
        }
    }

    pub async fn load() -> Result<Self> {
        load_config().await
    }

    pub async fn save(&self) -> Result<()> {
        save_config(self).await
    }
}

/// Load and validate configuration from file, environment, and defaults
pub async fn load_config() -> Result<Config> {
    let config = load_config_unvalidated().await?;
    config.validate()?;
    Ok(config)
}

/// Load configuration without validating required fields
pub async fn load_config_unvalidated() -> Result<Config> {
    let mut config = Config::default();

    let config_path = Config::get_config_path()?;
    if config_path.exists() {
        config = load_from_file(&config_path).await?;
    }

    apply_env_overrides(&mut config);

    Ok(config)
}

/// Persist configuration to the config file (secret excluded)
pub async fn save_config(config: &Config) -> Result<()> {
    let config_path = Config::get_config_path()?;

    if let Some(parent) = config_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let contents = toml::to_string_pretty(config)
        .map_err(|e| SactlError::serialization(format!("Failed to serialize config: {}", e)))?;
    tokio::fs::write(&config_path, contents).await?;

    Ok(())
}

async fn load_from_file(path: &PathBuf) -> Result<Config> {
    let contents = tokio::fs::read_to_string(path).await?;

    // TOML is the native format; JSON accepted as a fallback. When
    // neither parses, report the TOML error since that is what the
    // file is expected to contain.
    match toml::from_str::<Config>(&contents) {
        Ok(config) => Ok(config),
        Err(toml_error) => {
            if let Ok(config) = serde_json::from_str::<Config>(&contents) {
                return Ok(config);
            }
            Err(SactlError::config(format!(
                "Invalid TOML in {}: {}",
                path.display(),
                toml_error
            )))
        }
    }
}

/// Apply environment variable overrides on top of file/default values
pub fn apply_env_overrides(config: &mut Config) {
    if let Ok(value) = std::env::var("DEBUG") {
        config.debug = value.to_lowercase() == "true" || value == "1";
    }

    if let Ok(value) = std::env::var("AZURE_SUBSCRIPTION_ID") {
        config.subscription_id = value;
    }

    if let Ok(value) = std::env::var("AZURE_TENANT_ID") {
        config.tenant_id = Some(value);
    }

    if let Ok(value) = std::env::var("AZURE_CLIENT_ID") {
        config.client_id = Some(value);
    }

    if let Ok(value) = std::env::var("AZURE_CLIENT_SECRET") {
        config.client_secret = Some(Zeroizing::new(value));
    }

    if let Ok(value) = std::env::var("SACTL_RESOURCE_GROUP") {
        config.resource_group = value;
    }

    if let Ok(value) = std::env::var("SACTL_ACCOUNT_NAME") {
        config.account_name = Some(value);
    }

    if let Ok(value) = std::env::var("SACTL_LOCATION") {
        config.location = value;
    }

    if let Ok(value) = std::env::var("SACTL_SKU") {
        if let Ok(sku) = value.parse() {
            config.sku = sku;
        }
    }

    if let Ok(value) = std::env::var("SACTL_KIND") {
        if let Ok(kind) = value.parse() {
            config.kind = kind;
        }
    }
}
