//! Authentication provider trait and implementations
//!
//! This module defines the authentication provider trait and provides
//! implementations for the Azure authentication methods sactl supports.

use async_trait::async_trait;
use azure_core::auth::{AccessToken, TokenCredential};
use azure_identity::{ClientSecretCredential, DefaultAzureCredential, TokenCredentialOptions};
use std::sync::Arc;

use crate::error::{Result, SactlError};

/// Token scope for the Azure Resource Manager management plane
pub const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

/// Trait for Azure authentication providers
#[async_trait]
pub trait AzureAuthProvider: Send + Sync {
    /// Get an access token for the specified scopes
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken>;

    /// Get the tenant ID, if known
    fn tenant_id(&self) -> Option<String>;

    /// Get the client ID, if applicable
    fn client_id(&self) -> Option<String>;
}

/// Default Azure Credential Provider using DefaultAzureCredential
///
/// Resolves a credential from the environment, a managed identity, or
/// the Azure CLI, in that order.
pub struct DefaultAzureCredentialProvider {
    credential: Arc<DefaultAzureCredential>,
    tenant_id: Option<String>,
}

impl DefaultAzureCredentialProvider {
    /// Create a new DefaultAzureCredentialProvider
    pub fn new() -> Result<Self> {
        let credential = Arc::new(
            DefaultAzureCredential::create(TokenCredentialOptions::default()).map_err(|e| {
                SactlError::authentication(format!(
                    "Failed to create DefaultAzureCredential: {}",
                    e
                ))
            })?,
        );

        Ok(Self {
            credential,
            tenant_id: None,
        })
    }

    /// Create a new DefaultAzureCredentialProvider pinned to a tenant
    pub fn with_tenant(tenant_id: String) -> Result<Self> {
        let credential = Arc::new(
            DefaultAzureCredential::create(TokenCredentialOptions::default()).map_err(|e| {
                SactlError::authentication(format!(
                    "Failed to create DefaultAzureCredential: {}",
                    e
                ))
            })?,
        );

        Ok(Self {
            credential,
            tenant_id: Some(tenant_id),
        })
    }
}

#[async_trait]
impl AzureAuthProvider for DefaultAzureCredentialProvider {
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken> {
        let token = self
            .credential
            .get_token(scopes)
            .await
            .map_err(|e| SactlError::authentication(format!("Failed to get token: {}", e)))?;

        Ok(token)
    }

    fn tenant_id(&self) -> Option<String> {
        self.tenant_id.clone()
    }

    fn client_id(&self) -> Option<String> {
        None
    }
}

/// Client Secret Authentication Provider
///
/// Authenticates as a service principal with {tenant id, client id,
/// client secret}.
pub struct ClientSecretProvider {
    credential: Arc<ClientSecretCredential>,
    tenant_id: String,
    client_id: String,
}

impl ClientSecretProvider {
    /// Create a new ClientSecretProvider
    pub fn new(tenant_id: String, client_id: String, client_secret: String) -> Result<Self> {
        let authority = format!("https://login.microsoftonline.com/{}", tenant_id);
        let authority_url = url::Url::parse(&authority)
            .map_err(|e| SactlError::config(format!("Invalid authority URL: {}", e)))?;

        let http_client = Arc::new(reqwest::Client::new());
        let credential = Arc::new(ClientSecretCredential::new(
            http_client,
            authority_url,
            tenant_id.clone(),
            client_id.clone(),
            client_secret,
        ));

        Ok(Self {
            credential,
            tenant_id,
            client_id,
        })
    }
}

#[async_trait]
impl AzureAuthProvider for ClientSecretProvider {
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken> {
        let token = self
            .credential
            .get_token(scopes)
            .await
            .map_err(|e| SactlError::authentication(format!("Failed to get token: {}", e)))?;

        Ok(token)
    }

    fn tenant_id(&self) -> Option<String> {
        Some(self.tenant_id.clone())
    }

    fn client_id(&self) -> Option<String> {
        Some(self.client_id.clone())
    }
}

/// Authentication provider factory
pub struct AuthProviderFactory;

impl AuthProviderFactory {
    /// Create an authentication provider from the resolved configuration.
    ///
    /// A full service principal identity (tenant + client + secret)
    /// selects client secret auth; anything else falls back to
    /// DefaultAzureCredential.
    pub fn create_provider(config: &crate::config::Config) -> Result<Arc<dyn AzureAuthProvider>> {
        match config.credential_type.to_lowercase().as_str() {
            "clientsecret" | "client_secret" => {
                let tenant_id = config.tenant_id.clone().ok_or_else(|| {
                    SactlError::config("tenant_id is required for client secret authentication")
                })?;
                let client_id = config.client_id.clone().ok_or_else(|| {
                    SactlError::config("client_id is required for client secret authentication")
                })?;
                let client_secret = config.client_secret_value().ok_or_else(|| {
                    SactlError::config("client_secret is required for client secret authentication")
                })?;

                Ok(Arc::new(ClientSecretProvider::new(
                    tenant_id,
                    client_id,
                    client_secret,
                )?))
            }
            "default" | "defaultazurecredential" => {
                if let Some(tenant_id) = &config.tenant_id {
                    Ok(Arc::new(DefaultAzureCredentialProvider::with_tenant(
                        tenant_id.clone(),
                    )?))
                } else {
                    Ok(Arc::new(DefaultAzureCredentialProvider::new()?))
                }
            }
            "auto" => {
                if config.has_service_principal() {
                    Self::create_with_type(config, "clientsecret")
                } else {
                    Self::create_with_type(config, "default")
                }
            }
            other => Err(SactlError::config(format!(
                "Unsupported authentication provider: {}",
                other
            ))),
        }
    }

    fn create_with_type(
        config: &crate::config::Config,
        credential_type: &str,
    ) -> Result<Arc<dyn AzureAuthProvider>> {
        let mut cfg = config.clone();
        cfg.credential_type = credential_type.to_string();
        Self::create_provider(&cfg)
    }
}
