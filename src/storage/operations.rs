//! Storage account operations implementation
//!
//! This module provides the storage management operations against the
//! Azure Resource Manager REST API: resource provider registration,
//! resource group upsert, account CRUD, and access key handling.

use async_trait::async_trait;
use reqwest::{header::HeaderMap, Client};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use super::models::{
    AccountCreateRequest, AccountSummary, AccountUpdateRequest, NameAvailability,
    ProviderRegistration, ResourceGroup, StorageAccountKey, StorageAccountProperties,
};
use crate::auth::provider::{AzureAuthProvider, MANAGEMENT_SCOPE};
use crate::error::{Result, SactlError};
use crate::utils::network::{classify_network_error, create_http_client, NetworkConfig};
use crate::utils::retry::retry_with_backoff;

/// api-version for Microsoft.Storage operations
const STORAGE_API_VERSION: &str = "2023-01-01";
/// api-version for resource group and provider operations
const RESOURCES_API_VERSION: &str = "2021-04-01";

/// Provisioning poll cadence for account creation (an ARM long-running
/// operation); 60 * 5s bounds the wait at five minutes.
const PROVISIONING_POLL_INTERVAL_SECS: u64 = 5;
const PROVISIONING_POLL_ATTEMPTS: u32 = 60;

/// Trait for storage management operations.
///
/// The lifecycle orchestrator and the CLI depend only on this trait, so
/// the ARM binding can be swapped without touching orchestration logic.
#[async_trait]
pub trait StorageOperations: Send + Sync {
    /// Register the Microsoft.Storage resource provider for the
    /// subscription; a no-op success when already registered
    async fn register_provider(&self) -> Result<ProviderRegistration>;

    /// Create or update a resource group; idempotent by name
    async fn upsert_resource_group(&self, name: &str, location: &str) -> Result<ResourceGroup>;

    /// Check global availability of a storage account name
    async fn check_name_availability(&self, name: &str) -> Result<NameAvailability>;

    /// Create or update a storage account, waiting for provisioning to
    /// complete
    async fn upsert_account(&self, request: &AccountCreateRequest)
        -> Result<StorageAccountProperties>;

    /// Fetch full account properties by name
    async fn get_account(
        &self,
        resource_group: &str,
        account_name: &str,
    ) -> Result<StorageAccountProperties>;

    /// List account summaries, scoped to a resource group when given,
    /// otherwise subscription-wide. Pages are drained fully in service
    /// order.
    async fn list_accounts(&self, resource_group: Option<&str>) -> Result<Vec<AccountSummary>>;

    /// List the current access key set
    async fn list_keys(
        &self,
        resource_group: &str,
        account_name: &str,
    ) -> Result<Vec<StorageAccountKey>>;

    /// Regenerate one named key and return the refreshed key set
    async fn regenerate_key(
        &self,
        resource_group: &str,
        account_name: &str,
        key_name: &str,
    ) -> Result<Vec<StorageAccountKey>>;

    /// Update mutable account attributes in place, preserving everything
    /// not named in the request
    async fn update_account(
        &self,
        resource_group: &str,
        account_name: &str,
        request: &AccountUpdateRequest,
    ) -> Result<StorageAccountProperties>;

    /// Delete an account by name; surfaces AccountNotFound when absent
    async fn delete_account(&self, resource_group: &str, account_name: &str) -> Result<()>;
}

/// Build the ARM resource ID of a storage account
pub fn account_resource_id(subscription_id: &str, resource_group: &str, account_name: &str) -> String {
    format!(
        "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Storage/storageAccounts/{}",
        subscription_id, resource_group, account_name
    )
}

/// Build the ARM resource ID of a resource group
pub fn group_resource_id(subscription_id: &str, resource_group: &str) -> String {
    format!(
        "/subscriptions/{}/resourceGroups/{}",
        subscription_id, resource_group
    )
}

/// Build the merged update body for an account.
///
/// ARM PATCH semantics replace whole top-level sections, so tags must be
/// resubmitted in full or they are cleared. The merge takes the request
/// value when set and falls back to the live account otherwise; kind and
/// location are never resubmitted on update.
pub fn merged_update_body(
    current: &StorageAccountProperties,
    request: &AccountUpdateRequest,
) -> Value {
    let sku = request.sku.unwrap_or(current.sku);
    let tags: &HashMap<String, String> = request.tags.as_ref().unwrap_or(&current.tags);

    json!({
        "sku": { "name": sku.as_str() },
        "tags": tags,
    })
}

/// Build a listing summary straight from a wire item.
///
/// Listings include accounts this tool did not create, so the summary
/// carries the raw SKU and kind strings rather than forcing them
/// through the closed enums; an unrecognized SKU must not drop an
/// account from the listing. Only a missing name skips an entry.
pub fn account_summary_from_wire(item: &Value) -> Option<AccountSummary> {
    let name = item.get("name").and_then(|v| v.as_str())?.to_string();

    let resource_group = item
        .get("id")
        .and_then(|v| v.as_str())
        .and_then(|id| id.split('/').nth(4))
        .unwrap_or_default()
        .to_string();

    Some(AccountSummary {
        name,
        resource_group,
        location: item
            .get("location")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        sku: item
            .get("sku")
            .and_then(|s| s.get("name"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        kind: item
            .get("kind")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        provisioning_state: item
            .get("properties")
            .and_then(|p| p.get("provisioningState"))
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown")
            .to_string(),
    })
}

/// Azure Resource Manager storage operations implementation
pub struct AzureStorageOperations {
    auth_provider: Arc<dyn AzureAuthProvider>,
    http_client: Client,
    subscription_id: String,
}

impl AzureStorageOperations {
    /// Create a new ARM storage operations instance
    pub fn new(auth_provider: Arc<dyn AzureAuthProvider>, subscription_id: String) -> Result<Self> {
        let network_config = NetworkConfig::default();
        let http_client = create_http_client(&network_config)?;

        Ok(Self {
            auth_provider,
            http_client,
            subscription_id,
        })
    }

    /// Get an access token for Azure Resource Manager
    async fn get_management_token(&self) -> Result<String> {
        let token = self.auth_provider.get_token(&[MANAGEMENT_SCOPE]).await?;
        let secret = token.token.secret().to_string();
        if secret.is_empty() {
            return Err(SactlError::authentication(
                "Credential provider returned an empty token",
            ));
        }
        Ok(secret)
    }

    /// Create authorized headers for the ARM REST API
    async fn create_headers(&self) -> Result<HeaderMap> {
        let token = self.get_management_token().await?;
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            format!("Bearer {}", token)
                .parse()
                .map_err(|e| SactlError::authentication(format!("Invalid token format: {}", e)))?,
        );
        headers.insert(
            "Content-Type",
            "application/json"
                .parse()
                .map_err(|e| SactlError::unknown(format!("Invalid header value: {}", e)))?,
        );
        Ok(headers)
    }

    /// Build an Azure Resource Manager URL
    fn build_arm_url(&self, path: &str) -> String {
        format!("https://management.azure.com{}", path)
    }

    /// Parse an ARM error response into the sactl error taxonomy
    fn parse_azure_error(&self, status: u16, body: &str, resource_name: &str) -> SactlError {
        if let Ok(error_json) = serde_json::from_str::<Value>(body) {
            if let Some(error) = error_json.get("error") {
                let code = error.get("code").and_then(|c| c.as_str()).unwrap_or("");
                let message = error
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or(body);

                return match code {
                    "StorageAccountAlreadyTaken" | "StorageAccountAlreadyExists"
                    | "AccountNameInvalid" => SactlError::name_unavailable(resource_name, message),
                    "ResourceGroupNotFound" => {
                        SactlError::resource_group_not_found(resource_name)
                    }
                    "ResourceNotFound" | "StorageAccountNotFound" | "NotFound" => {
                        SactlError::account_not_found(resource_name)
                    }
                    _ => SactlError::azure_api(format!("HTTP {} [{}]: {}", status, code, message)),
                };
            }
        }
        SactlError::azure_api(format!("HTTP {}: {}", status, body))
    }

    /// Retry wrapper for transient ARM faults
    async fn execute_with_retry<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        retry_with_backoff(operation, crate::utils::retry::RetryOptions::default()).await
    }

    /// Poll the account until provisioning finishes
    async fn wait_for_provisioning(
        &self,
        resource_group: &str,
        account_name: &str,
    ) -> Result<StorageAccountProperties> {
        for _ in 0..PROVISIONING_POLL_ATTEMPTS {
            tokio::time::sleep(std::time::Duration::from_secs(
                PROVISIONING_POLL_INTERVAL_SECS,
            ))
            .await;

            match self.fetch_account(resource_group, account_name).await {
                Ok(account) => {
                    if account.provisioning_state.eq_ignore_ascii_case("succeeded") {
                        return Ok(account);
                    }
                    tracing::debug!(
                        account = account_name,
                        state = %account.provisioning_state,
                        "storage account still provisioning"
                    );
                }
                // The account can 404 for a short window right after the
                // create is accepted
                Err(SactlError::AccountNotFound { .. }) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(SactlError::azure_api(format!(
            "Storage account '{}' did not finish provisioning in time",
            account_name
        )))
    }

    /// Single GET of account properties, without retry
    async fn fetch_account(
        &self,
        resource_group: &str,
        account_name: &str,
    ) -> Result<StorageAccountProperties> {
        let headers = self.create_headers().await?;
        let resource_id =
            account_resource_id(&self.subscription_id, resource_group, account_name);
        let url = self.build_arm_url(&format!(
            "{}?api-version={}",
            resource_id, STORAGE_API_VERSION
        ));

        let response = self
            .http_client
            .get(&url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| classify_network_error(&e, &url))?;

        if response.status().as_u16() == 404 {
            return Err(SactlError::account_not_found(account_name));
        }

        if !response.status().is_success() {
            let status_code = response.status().as_u16();
            let error_body = response.text().await.unwrap_or_default();
            return Err(self.parse_azure_error(status_code, &error_body, account_name));
        }

        let account_data: Value = response.json().await.map_err(|e| {
            SactlError::serialization(format!("Failed to parse account response: {}", e))
        })?;

        self.parse_account_properties(&account_data)
    }

    /// Drain a paged ARM list response, following nextLink in order
    async fn drain_account_pages(&self, first_url: String) -> Result<Vec<AccountSummary>> {
        let mut accounts = Vec::new();
        let mut next_url = Some(first_url);

        while let Some(url) = next_url.take() {
            let headers = self.create_headers().await?;
            let response = self
                .http_client
                .get(&url)
                .headers(headers)
                .send()
                .await
                .map_err(|e| classify_network_error(&e, &url))?;

            if !response.status().is_success() {
                let status_code = response.status().as_u16();
                let error_body = response.text().await.unwrap_or_default();
                return Err(self.parse_azure_error(status_code, &error_body, "storageAccounts"));
            }

            let page: Value = response.json().await.map_err(|e| {
                SactlError::serialization(format!("Failed to parse account list: {}", e))
            })?;

            if let Some(items) = page.get("value").and_then(|v| v.as_array()) {
                for item in items {
                    match account_summary_from_wire(item) {
                        Some(summary) => accounts.push(summary),
                        None => tracing::warn!("skipping account list entry without a name"),
                    }
                }
            }

            next_url = page
                .get("nextLink")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());
        }

        Ok(accounts)
    }

    /// Parse an ARM storage account response into StorageAccountProperties
    fn parse_account_properties(&self, account_data: &Value) -> Result<StorageAccountProperties> {
        let id = account_data
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let name = account_data
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let location = account_data
            .get("location")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        // Resource group and subscription come out of the resource ID
        let resource_group = id.split('/').nth(4).unwrap_or_default().to_string();
        let subscription_id = id
            .split('/')
            .nth(2)
            .unwrap_or(&self.subscription_id)
            .to_string();

        let sku = account_data
            .get("sku")
            .and_then(|s| s.get("name"))
            .and_then(|n| n.as_str())
            .ok_or_else(|| SactlError::serialization("Missing sku in account response"))?
            .parse()?;

        let kind = account_data
            .get("kind")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SactlError::serialization("Missing kind in account response"))?
            .parse()?;

        let properties = account_data.get("properties");

        let provisioning_state = properties
            .and_then(|p| p.get("provisioningState"))
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown")
            .to_string();

        let creation_time = properties
            .and_then(|p| p.get("creationTime"))
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<chrono::DateTime<chrono::Utc>>().ok());

        let mut tags = HashMap::new();
        if let Some(tags_obj) = account_data.get("tags").and_then(|v| v.as_object()) {
            for (key, value) in tags_obj {
                if let Some(val_str) = value.as_str() {
                    tags.insert(key.clone(), val_str.to_string());
                }
            }
        }

        Ok(StorageAccountProperties {
            id,
            name,
            resource_group,
            subscription_id,
            location,
            sku,
            kind,
            provisioning_state,
            creation_time,
            tags,
        })
    }

    /// Parse the ARM key list response
    fn parse_key_list(&self, key_data: &Value) -> Result<Vec<StorageAccountKey>> {
        let entries = key_data
            .get("keys")
            .and_then(|v| v.as_array())
            .ok_or_else(|| SactlError::serialization("Missing keys in key list response"))?;

        let mut keys = Vec::with_capacity(entries.len());
        for entry in entries {
            let key_name = entry
                .get("keyName")
                .and_then(|v| v.as_str())
                .ok_or_else(|| SactlError::serialization("Missing keyName in key entry"))?
                .to_string();
            let value = entry
                .get("value")
                .and_then(|v| v.as_str())
                .ok_or_else(|| SactlError::serialization("Missing value in key entry"))?
                .to_string();
            let permissions = entry
                .get("permissions")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());

            keys.push(StorageAccountKey {
                key_name,
                value,
                permissions,
            });
        }

        Ok(keys)
    }
}

#[async_trait]
impl StorageOperations for AzureStorageOperations {
    async fn register_provider(&self) -> Result<ProviderRegistration> {
        let operation = || async {
            let headers = self.create_headers().await?;
            let url = self.build_arm_url(&format!(
                "/subscriptions/{}/providers/Microsoft.Storage/register?api-version={}",
                self.subscription_id, RESOURCES_API_VERSION
            ));

            let response = self
                .http_client
                .post(&url)
                .headers(headers)
                .send()
                .await
                .map_err(|e| classify_network_error(&e, &url))?;

            if !response.status().is_success() {
                let status_code = response.status().as_u16();
                let error_body = response.text().await.unwrap_or_default();
                return Err(SactlError::provider_registration(format!(
                    "HTTP {}: {}",
                    status_code, error_body
                )));
            }

            let provider_data: Value = response.json().await.map_err(|e| {
                SactlError::serialization(format!("Failed to parse provider response: {}", e))
            })?;

            Ok(ProviderRegistration {
                namespace: provider_data
                    .get("namespace")
                    .and_then(|v| v.as_str())
                    .unwrap_or("Microsoft.Storage")
                    .to_string(),
                registration_state: provider_data
                    .get("registrationState")
                    .and_then(|v| v.as_str())
                    .unwrap_or("Registering")
                    .to_string(),
            })
        };

        self.execute_with_retry(operation).await
    }

    async fn upsert_resource_group(&self, name: &str, location: &str) -> Result<ResourceGroup> {
        let operation = || async {
            let headers = self.create_headers().await?;
            let resource_id = group_resource_id(&self.subscription_id, name);
            let url = self.build_arm_url(&format!(
                "{}?api-version={}",
                resource_id, RESOURCES_API_VERSION
            ));

            let body = json!({ "location": location });

            let response = self
                .http_client
                .put(&url)
                .headers(headers)
                .json(&body)
                .send()
                .await
                .map_err(|e| classify_network_error(&e, &url))?;

            if !response.status().is_success() {
                let status_code = response.status().as_u16();
                let error_body = response.text().await.unwrap_or_default();
                return Err(self.parse_azure_error(status_code, &error_body, name));
            }

            let group_data: Value = response.json().await.map_err(|e| {
                SactlError::serialization(format!("Failed to parse resource group response: {}", e))
            })?;

            Ok(ResourceGroup {
                id: group_data
                    .get("id")
                    .and_then(|v| v.as_str())
                    .unwrap_or(&resource_id)
                    .to_string(),
                name: group_data
                    .get("name")
                    .and_then(|v| v.as_str())
                    .unwrap_or(name)
                    .to_string(),
                location: group_data
                    .get("location")
                    .and_then(|v| v.as_str())
                    .unwrap_or(location)
                    .to_string(),
                provisioning_state: group_data
                    .get("properties")
                    .and_then(|p| p.get("provisioningState"))
                    .and_then(|v| v.as_str())
                    .unwrap_or("Unknown")
                    .to_string(),
            })
        };

        self.execute_with_retry(operation).await
    }

    async fn check_name_availability(&self, name: &str) -> Result<NameAvailability> {
        let operation = || async {
            let headers = self.create_headers().await?;
            let url = self.build_arm_url(&format!(
                "/subscriptions/{}/providers/Microsoft.Storage/checkNameAvailability?api-version={}",
                self.subscription_id, STORAGE_API_VERSION
            ));

            let body = json!({
                "name": name,
                "type": "Microsoft.Storage/storageAccounts",
            });

            let response = self
                .http_client
                .post(&url)
                .headers(headers)
                .json(&body)
                .send()
                .await
                .map_err(|e| classify_network_error(&e, &url))?;

            if !response.status().is_success() {
                let status_code = response.status().as_u16();
                let error_body = response.text().await.unwrap_or_default();
                return Err(self.parse_azure_error(status_code, &error_body, name));
            }

            let availability: Value = response.json().await.map_err(|e| {
                SactlError::serialization(format!("Failed to parse availability response: {}", e))
            })?;

            Ok(NameAvailability {
                name_available: availability
                    .get("nameAvailable")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false),
                reason: availability
                    .get("reason")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string()),
                message: availability
                    .get("message")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string()),
            })
        };

        self.execute_with_retry(operation).await
    }

    async fn upsert_account(
        &self,
        request: &AccountCreateRequest,
    ) -> Result<StorageAccountProperties> {
        let operation = || async {
            let headers = self.create_headers().await?;
            let resource_id = account_resource_id(
                &self.subscription_id,
                &request.resource_group,
                &request.name,
            );
            let url = self.build_arm_url(&format!(
                "{}?api-version={}",
                resource_id, STORAGE_API_VERSION
            ));

            let body = json!({
                "location": request.location,
                "sku": { "name": request.sku.as_str() },
                "kind": request.kind.as_str(),
                "tags": request.tags,
            });

            let response = self
                .http_client
                .put(&url)
                .headers(headers)
                .json(&body)
                .send()
                .await
                .map_err(|e| classify_network_error(&e, &url))?;

            let status = response.status();
            if !status.is_success() {
                let status_code = status.as_u16();
                let error_body = response.text().await.unwrap_or_default();
                return Err(self.parse_azure_error(status_code, &error_body, &request.name));
            }

            // 202 Accepted means provisioning continues asynchronously;
            // a 200 body already carries the finished account
            if status.as_u16() == 200 {
                let account_data: Value = response.json().await.map_err(|e| {
                    SactlError::serialization(format!("Failed to parse account response: {}", e))
                })?;
                let account = self.parse_account_properties(&account_data)?;
                if account.provisioning_state.eq_ignore_ascii_case("succeeded") {
                    return Ok(account);
                }
            }

            self.wait_for_provisioning(&request.resource_group, &request.name)
                .await
        };

        self.execute_with_retry(operation).await
    }

    async fn get_account(
        &self,
        resource_group: &str,
        account_name: &str,
    ) -> Result<StorageAccountProperties> {
        let operation = || async { self.fetch_account(resource_group, account_name).await };
        self.execute_with_retry(operation).await
    }

    async fn list_accounts(&self, resource_group: Option<&str>) -> Result<Vec<AccountSummary>> {
        let operation = || async {
            let url = if let Some(rg) = resource_group {
                self.build_arm_url(&format!(
                    "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Storage/storageAccounts?api-version={}",
                    self.subscription_id, rg, STORAGE_API_VERSION
                ))
            } else {
                self.build_arm_url(&format!(
                    "/subscriptions/{}/providers/Microsoft.Storage/storageAccounts?api-version={}",
                    self.subscription_id, STORAGE_API_VERSION
                ))
            };

            self.drain_account_pages(url).await
        };

        self.execute_with_retry(operation).await
    }

    async fn list_keys(
        &self,
        resource_group: &str,
        account_name: &str,
    ) -> Result<Vec<StorageAccountKey>> {
        let operation = || async {
            let headers = self.create_headers().await?;
            let resource_id =
                account_resource_id(&self.subscription_id, resource_group, account_name);
            let url = self.build_arm_url(&format!(
                "{}/listKeys?api-version={}",
                resource_id, STORAGE_API_VERSION
            ));

            let response = self
                .http_client
                .post(&url)
                .headers(headers)
                .send()
                .await
                .map_err(|e| classify_network_error(&e, &url))?;

            if response.status().as_u16() == 404 {
                return Err(SactlError::account_not_found(account_name));
            }

            if !response.status().is_success() {
                let status_code = response.status().as_u16();
                let error_body = response.text().await.unwrap_or_default();
                return Err(self.parse_azure_error(status_code, &error_body, account_name));
            }

            let key_data: Value = response.json().await.map_err(|e| {
                SactlError::serialization(format!("Failed to parse key list response: {}", e))
            })?;

            self.parse_key_list(&key_data)
        };

        self.execute_with_retry(operation).await
    }

    async fn regenerate_key(
        &self,
        resource_group: &str,
        account_name: &str,
        key_name: &str,
    ) -> Result<Vec<StorageAccountKey>> {
        let operation = || async {
            let headers = self.create_headers().await?;
            let resource_id =
                account_resource_id(&self.subscription_id, resource_group, account_name);
            let url = self.build_arm_url(&format!(
                "{}/regenerateKey?api-version={}",
                resource_id, STORAGE_API_VERSION
            ));

            let body = json!({ "keyName": key_name });

            let response = self
                .http_client
                .post(&url)
                .headers(headers)
                .json(&body)
                .send()
                .await
                .map_err(|e| classify_network_error(&e, &url))?;

            if response.status().as_u16() == 404 {
                return Err(SactlError::account_not_found(account_name));
            }

            if !response.status().is_success() {
                let status_code = response.status().as_u16();
                let error_body = response.text().await.unwrap_or_default();
                return Err(self.parse_azure_error(status_code, &error_body, account_name));
            }

            let key_data: Value = response.json().await.map_err(|e| {
                SactlError::serialization(format!("Failed to parse key list response: {}", e))
            })?;

            self.parse_key_list(&key_data)
        };

        self.execute_with_retry(operation).await
    }

    async fn update_account(
        &self,
        resource_group: &str,
        account_name: &str,
        request: &AccountUpdateRequest,
    ) -> Result<StorageAccountProperties> {
        let operation = || async {
            // Read the live account first so the merged body never clears
            // attributes the caller did not set
            let current = self.fetch_account(resource_group, account_name).await?;

            let headers = self.create_headers().await?;
            let resource_id =
                account_resource_id(&self.subscription_id, resource_group, account_name);
            let url = self.build_arm_url(&format!(
                "{}?api-version={}",
                resource_id, STORAGE_API_VERSION
            ));

            let body = merged_update_body(&current, request);

            let response = self
                .http_client
                .patch(&url)
                .headers(headers)
                .json(&body)
                .send()
                .await
                .map_err(|e| classify_network_error(&e, &url))?;

            if !response.status().is_success() {
                let status_code = response.status().as_u16();
                let error_body = response.text().await.unwrap_or_default();
                return Err(self.parse_azure_error(status_code, &error_body, account_name));
            }

            let account_data: Value = response.json().await.map_err(|e| {
                SactlError::serialization(format!("Failed to parse account response: {}", e))
            })?;

            self.parse_account_properties(&account_data)
        };

        self.execute_with_retry(operation).await
    }

    async fn delete_account(&self, resource_group: &str, account_name: &str) -> Result<()> {
        let operation = || async {
            let headers = self.create_headers().await?;
            let resource_id =
                account_resource_id(&self.subscription_id, resource_group, account_name);
            let url = self.build_arm_url(&format!(
                "{}?api-version={}",
                resource_id, STORAGE_API_VERSION
            ));

            let response = self
                .http_client
                .delete(&url)
                .headers(headers)
                .send()
                .await
                .map_err(|e| classify_network_error(&e, &url))?;

            if response.status().as_u16() == 404 {
                return Err(SactlError::account_not_found(account_name));
            }

            if !response.status().is_success() {
                let status_code = response.status().as_u16();
                let error_body = response.text().await.unwrap_or_default();
                return Err(self.parse_azure_error(status_code, &error_body, account_name));
            }

            Ok(())
        };

        self.execute_with_retry(operation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::{AccountKind, AccountSku};

    fn sample_account() -> StorageAccountProperties {
        let mut tags = HashMap::new();
        tags.insert("key1".to_string(), "value1".to_string());
        tags.insert("key2".to_string(), "value2".to_string());

        StorageAccountProperties {
            id: account_resource_id("sub-id", "TestResourceGroup", "storagesample1a2b3c4d"),
            name: "storagesample1a2b3c4d".to_string(),
            resource_group: "TestResourceGroup".to_string(),
            subscription_id: "sub-id".to_string(),
            location: "westus".to_string(),
            sku: AccountSku::StandardGrs,
            kind: AccountKind::StorageV2,
            provisioning_state: "Succeeded".to_string(),
            creation_time: None,
            tags,
        }
    }

    #[test]
    fn account_resource_id_layout() {
        let id = account_resource_id("sub", "rg", "acct");
        assert_eq!(
            id,
            "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Storage/storageAccounts/acct"
        );
    }

    #[test]
    fn merged_update_keeps_tags_when_only_sku_changes() {
        let current = sample_account();
        let request = AccountUpdateRequest {
            sku: Some(AccountSku::StandardLrs),
            tags: None,
        };

        let body = merged_update_body(&current, &request);

        assert_eq!(body["sku"]["name"], "Standard_LRS");
        assert_eq!(body["tags"]["key1"], "value1");
        assert_eq!(body["tags"]["key2"], "value2");
        // Kind and location are immutable on update and must not be sent
        assert!(body.get("kind").is_none());
        assert!(body.get("location").is_none());
    }

    #[test]
    fn listing_keeps_accounts_with_unrecognized_skus() {
        let item = json!({
            "id": "/subscriptions/sub/resourceGroups/legacy-rg/providers/Microsoft.Storage/storageAccounts/legacy1",
            "name": "legacy1",
            "location": "westus",
            "sku": { "name": "Standard_FUTURE" },
            "kind": "StorageV2",
            "properties": { "provisioningState": "Succeeded" }
        });

        let summary = account_summary_from_wire(&item).unwrap();
        assert_eq!(summary.name, "legacy1");
        assert_eq!(summary.resource_group, "legacy-rg");
        assert_eq!(summary.sku, "Standard_FUTURE");
        assert_eq!(summary.provisioning_state, "Succeeded");

        // Only a nameless entry is skipped
        assert!(account_summary_from_wire(&json!({ "location": "westus" })).is_none());
    }

    #[test]
    fn merged_update_replaces_tags_when_given() {
        let current = sample_account();
        let mut new_tags = HashMap::new();
        new_tags.insert("env".to_string(), "test".to_string());
        let request = AccountUpdateRequest {
            sku: None,
            tags: Some(new_tags),
        };

        let body = merged_update_body(&current, &request);

        assert_eq!(body["sku"]["name"], "Standard_GRS");
        assert_eq!(body["tags"]["env"], "test");
        assert!(body["tags"].get("key1").is_none());
    }
}
