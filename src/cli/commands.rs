//! CLI commands and argument parsing
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, subcommands, and their arguments.

use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::sync::Arc;

use crate::auth::provider::AuthProviderFactory;
use crate::config::Config;
use crate::error::{Result, SactlError};
use crate::storage::models::{
    AccountCreateRequest, AccountKind, AccountSku, AccountUpdateRequest,
};
use crate::storage::{
    AzureStorageOperations, LifecycleOrchestrator, LifecycleRequest, StorageManager,
    StorageOperations,
};
use crate::utils::format::{DisplayUtils, OutputFormat};

/// Parse a single key=value pair
fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid key=value pair: '{s}'"))?;
    Ok((key.trim().to_string(), value.trim().to_string()))
}

fn parse_sku(s: &str) -> std::result::Result<AccountSku, String> {
    s.parse().map_err(|e: SactlError| e.to_string())
}

fn parse_kind(s: &str) -> std::result::Result<AccountKind, String> {
    s.parse().map_err(|e: SactlError| e.to_string())
}

#[derive(Parser)]
#[command(name = "sactl")]
#[command(about = "Manage the Azure storage account lifecycle")]
#[command(version, author)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Azure subscription ID
    #[arg(long, global = true, env = "AZURE_SUBSCRIPTION_ID")]
    pub subscription: Option<String>,

    /// Azure credential type to use (auto, default, clientsecret)
    #[arg(long, global = true, value_name = "TYPE", env = "SACTL_CREDENTIAL_TYPE")]
    pub credential_type: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full lifecycle: register provider, create group and
    /// account, inspect, rotate a key, update the SKU, delete
    Run {
        /// Resource group name
        #[arg(short = 'g', long)]
        group: Option<String>,
        /// Storage account name (generated when omitted)
        #[arg(short, long)]
        account: Option<String>,
        /// Azure region
        #[arg(short, long)]
        location: Option<String>,
        /// SKU for creation (e.g. Standard_GRS)
        #[arg(long, value_parser = parse_sku)]
        sku: Option<AccountSku>,
        /// Account kind (e.g. StorageV2)
        #[arg(long, value_parser = parse_kind)]
        kind: Option<AccountKind>,
        /// Tags in key=value format
        #[arg(short, long, value_parser = parse_key_val)]
        tags: Vec<(String, String)>,
        /// SKU applied during the update step
        #[arg(long, value_parser = parse_sku, default_value = "Standard_LRS")]
        update_sku: AccountSku,
        /// Key to regenerate during the rotation step
        #[arg(long, default_value = "key1")]
        regenerate: String,
        /// Keep the account instead of deleting it at the end
        #[arg(long)]
        keep: bool,
    },
    /// Storage account operations
    Account {
        #[command(subcommand)]
        command: AccountCommands,
    },
    /// Resource group operations
    Group {
        #[command(subcommand)]
        command: GroupCommands,
    },
    /// Resource provider operations
    Provider {
        #[command(subcommand)]
        command: ProviderCommands,
    },
    /// Configuration management commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a storage account
    Create {
        /// Account name
        name: String,
        /// Resource group
        #[arg(short = 'g', long)]
        resource_group: Option<String>,
        /// Azure region
        #[arg(short, long)]
        location: Option<String>,
        /// SKU (e.g. Standard_GRS)
        #[arg(long, value_parser = parse_sku)]
        sku: Option<AccountSku>,
        /// Account kind (e.g. StorageV2)
        #[arg(long, value_parser = parse_kind)]
        kind: Option<AccountKind>,
        /// Tags in key=value format
        #[arg(short, long, value_parser = parse_key_val)]
        tags: Vec<(String, String)>,
    },
    /// Show account properties
    Show {
        /// Account name
        name: String,
        /// Resource group
        #[arg(short = 'g', long)]
        resource_group: Option<String>,
    },
    /// List accounts in a resource group, or the whole subscription
    /// with --all (alias: ls)
    #[command(alias = "ls")]
    List {
        /// Resource group to scope the listing to
        #[arg(short = 'g', long)]
        resource_group: Option<String>,
        /// List across the whole subscription
        #[arg(long)]
        all: bool,
    },
    /// Update mutable account attributes (SKU, tags)
    Update {
        /// Account name
        name: String,
        /// Resource group
        #[arg(short = 'g', long)]
        resource_group: Option<String>,
        /// New SKU
        #[arg(long, value_parser = parse_sku)]
        sku: Option<AccountSku>,
        /// Replacement tag set in key=value format
        #[arg(short, long, value_parser = parse_key_val)]
        tags: Vec<(String, String)>,
    },
    /// Delete a storage account (alias: rm)
    #[command(alias = "rm")]
    Delete {
        /// Account name
        name: String,
        /// Resource group
        #[arg(short = 'g', long)]
        resource_group: Option<String>,
        /// Skip the existence check and confirmation output
        #[arg(short, long)]
        force: bool,
    },
    /// List access keys
    Keys {
        /// Account name
        name: String,
        /// Resource group
        #[arg(short = 'g', long)]
        resource_group: Option<String>,
        /// Print key values instead of masking them
        #[arg(long)]
        reveal: bool,
    },
    /// Regenerate one named access key
    RegenerateKey {
        /// Account name
        name: String,
        /// Key to regenerate (key1 or key2)
        #[arg(long, default_value = "key1")]
        key: String,
        /// Resource group
        #[arg(short = 'g', long)]
        resource_group: Option<String>,
        /// Print key values instead of masking them
        #[arg(long)]
        reveal: bool,
    },
    /// Check global availability of an account name
    CheckName {
        /// Account name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum GroupCommands {
    /// Create or update a resource group
    Create {
        /// Resource group name
        name: String,
        /// Azure region
        #[arg(short, long)]
        location: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ProviderCommands {
    /// Register the Microsoft.Storage resource provider
    Register,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the resolved configuration
    Show,
    /// Write a default configuration file
    Init,
    /// Print the configuration file path
    Path,
}

impl Cli {
    /// Execute the parsed command against the resolved configuration
    pub async fn execute(self, mut config: Config) -> Result<()> {
        if let Some(subscription) = &self.subscription {
            config.subscription_id = subscription.clone();
        }
        if let Some(credential_type) = &self.credential_type {
            config.credential_type = credential_type.clone();
        }
        if self.debug {
            config.debug = true;
        }

        let format = self.format;
        let no_color = self.no_color;

        match self.command {
            Commands::Config { command } => execute_config(command, &config).await,
            Commands::Run {
                group,
                account,
                location,
                sku,
                kind,
                tags,
                update_sku,
                regenerate,
                keep,
            } => {
                let auth_provider = AuthProviderFactory::create_provider(&config)?;
                let ops: Arc<dyn StorageOperations> = Arc::new(AzureStorageOperations::new(
                    auth_provider.clone(),
                    config.subscription_id.clone(),
                )?);
                let orchestrator = LifecycleOrchestrator::new(auth_provider, ops, no_color);

                let request = LifecycleRequest {
                    resource_group: group.unwrap_or_else(|| config.resource_group.clone()),
                    account_name: account.unwrap_or_else(|| config.resolve_account_name()),
                    location: location.unwrap_or_else(|| config.location.clone()),
                    sku: sku.unwrap_or(config.sku),
                    kind: kind.unwrap_or(config.kind),
                    tags: merge_tags(&config.tags, tags),
                    update_sku,
                    regenerate_key_name: regenerate,
                    keep_account: keep,
                };

                let result = orchestrator.run(&request).await?;

                let display = DisplayUtils::new(no_color);
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&result)?);
                    }
                    OutputFormat::Table => {
                        display.print_header("Lifecycle run completed")?;
                        display.print_key_value("Run ID", &result.run_id.to_string())?;
                        display.print_key_value(
                            "Steps",
                            &result
                                .completed_steps
                                .iter()
                                .map(|s| s.to_string())
                                .collect::<Vec<_>>()
                                .join(", "),
                        )?;
                        if let Some(account) = &result.account {
                            display.print_key_value("Account", &account.name)?;
                            display.print_key_value("Final SKU", account.sku.as_str())?;
                        }
                        display.print_key_value("Keys", &result.keys.len().to_string())?;
                        display.print_key_value(
                            "Accounts in group",
                            &result.group_account_count.to_string(),
                        )?;
                        display.print_key_value(
                            "Accounts in subscription",
                            &result.subscription_account_count.to_string(),
                        )?;
                        display.print_key_value("Deleted", &result.deleted.to_string())?;
                    }
                }
                Ok(())
            }
            Commands::Account { command } => {
                let manager = build_manager(&config, no_color)?;
                execute_account(command, &config, &manager, format).await
            }
            Commands::Group { command } => {
                let manager = build_manager(&config, no_color)?;
                execute_group(command, &config, &manager).await
            }
            Commands::Provider { command } => {
                let manager = build_manager(&config, no_color)?;
                match command {
                    ProviderCommands::Register => {
                        manager.register_provider().await?;
                        Ok(())
                    }
                }
            }
        }
    }
}

fn build_operations(config: &Config) -> Result<Arc<dyn StorageOperations>> {
    let auth_provider = AuthProviderFactory::create_provider(config)?;
    let ops = AzureStorageOperations::new(auth_provider, config.subscription_id.clone())?;
    Ok(Arc::new(ops))
}

fn build_manager(config: &Config, no_color: bool) -> Result<StorageManager> {
    let ops = build_operations(config)?;
    Ok(StorageManager::new(ops, no_color))
}

fn merge_tags(
    defaults: &HashMap<String, String>,
    overrides: Vec<(String, String)>,
) -> HashMap<String, String> {
    let mut tags = defaults.clone();
    for (key, value) in overrides {
        tags.insert(key, value);
    }
    tags
}

async fn execute_account(
    command: AccountCommands,
    config: &Config,
    manager: &StorageManager,
    format: OutputFormat,
) -> Result<()> {
    match command {
        AccountCommands::Create {
            name,
            resource_group,
            location,
            sku,
            kind,
            tags,
        } => {
            let request = AccountCreateRequest {
                name,
                resource_group: resource_group.unwrap_or_else(|| config.resource_group.clone()),
                location: location.unwrap_or_else(|| config.location.clone()),
                sku: sku.unwrap_or(config.sku),
                kind: kind.unwrap_or(config.kind),
                tags: merge_tags(&config.tags, tags),
            };
            manager.create_account(&request).await?;
            Ok(())
        }
        AccountCommands::Show {
            name,
            resource_group,
        } => {
            let rg = resource_group.unwrap_or_else(|| config.resource_group.clone());
            let account = manager.get_account_properties(&rg, &name).await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&account)?),
                OutputFormat::Table => manager.display_account_details(&account)?,
            }
            Ok(())
        }
        AccountCommands::List {
            resource_group,
            all,
        } => {
            let scope = if all {
                None
            } else {
                Some(resource_group.unwrap_or_else(|| config.resource_group.clone()))
            };
            manager
                .list_accounts_formatted(scope.as_deref(), format)
                .await?;
            Ok(())
        }
        AccountCommands::Update {
            name,
            resource_group,
            sku,
            tags,
        } => {
            if sku.is_none() && tags.is_empty() {
                return Err(SactlError::invalid_argument(
                    "Nothing to update: pass --sku and/or --tags",
                ));
            }
            let rg = resource_group.unwrap_or_else(|| config.resource_group.clone());
            let request = AccountUpdateRequest {
                sku,
                tags: if tags.is_empty() {
                    None
                } else {
                    Some(tags.into_iter().collect())
                },
            };
            manager.update_account(&rg, &name, &request).await?;
            Ok(())
        }
        AccountCommands::Delete {
            name,
            resource_group,
            force,
        } => {
            let rg = resource_group.unwrap_or_else(|| config.resource_group.clone());
            manager.delete_account_safe(&rg, &name, force).await
        }
        AccountCommands::Keys {
            name,
            resource_group,
            reveal,
        } => {
            let rg = resource_group.unwrap_or_else(|| config.resource_group.clone());
            manager
                .list_keys_formatted(&rg, &name, reveal, format)
                .await?;
            Ok(())
        }
        AccountCommands::RegenerateKey {
            name,
            key,
            resource_group,
            reveal,
        } => {
            let rg = resource_group.unwrap_or_else(|| config.resource_group.clone());
            manager
                .regenerate_key(&rg, &name, &key, reveal, format)
                .await?;
            Ok(())
        }
        AccountCommands::CheckName { name } => {
            manager.check_name(&name).await?;
            Ok(())
        }
    }
}

async fn execute_group(
    command: GroupCommands,
    config: &Config,
    manager: &StorageManager,
) -> Result<()> {
    match command {
        GroupCommands::Create { name, location } => {
            let location = location.unwrap_or_else(|| config.location.clone());
            manager.upsert_resource_group(&name, &location).await?;
            Ok(())
        }
    }
}

async fn execute_config(command: ConfigCommands, config: &Config) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let contents = toml::to_string_pretty(config).map_err(|e| {
                SactlError::serialization(format!("Failed to serialize config: {}", e))
            })?;
            println!("{contents}");
            Ok(())
        }
        ConfigCommands::Init => {
            let path = Config::get_config_path()?;
            if path.exists() {
                return Err(SactlError::config(format!(
                    "Configuration file already exists at {}",
                    path.display()
                )));
            }
            Config::default().save().await?;
            println!("Wrote default configuration to {}", path.display());
            Ok(())
        }
        ConfigCommands::Path => {
            println!("{}", Config::get_config_path()?.display());
            Ok(())
        }
    }
}
