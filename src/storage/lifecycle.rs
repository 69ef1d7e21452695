//! Storage account lifecycle orchestrator
//!
//! This module drives the fixed end-to-end sequence: authenticate,
//! register the resource provider, upsert the resource group, create the
//! account, read it back, list accounts at both scopes, rotate a key,
//! update the SKU in place, and delete the account. Steps run strictly
//! in order; the first error halts the run and is reported with the
//! failing step's name.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::models::{
    AccountCreateRequest, AccountKind, AccountSku, AccountUpdateRequest, StorageAccountKey,
    StorageAccountProperties,
};
use super::operations::StorageOperations;
use crate::auth::provider::{AzureAuthProvider, MANAGEMENT_SCOPE};
use crate::error::{Result, SactlError};
use crate::utils::format::DisplayUtils;

/// Named steps of the lifecycle run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Step {
    Authenticate,
    RegisterProvider,
    UpsertResourceGroup,
    CreateAccount,
    Inspect,
    RotateKeys,
    UpdateAccount,
    DeleteAccount,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Step::Authenticate => "authenticate",
            Step::RegisterProvider => "register-provider",
            Step::UpsertResourceGroup => "upsert-resource-group",
            Step::CreateAccount => "create-account",
            Step::Inspect => "inspect",
            Step::RotateKeys => "rotate-keys",
            Step::UpdateAccount => "update-account",
            Step::DeleteAccount => "delete-account",
        };
        f.write_str(name)
    }
}

/// Parameters for one lifecycle run
#[derive(Debug, Clone)]
pub struct LifecycleRequest {
    pub resource_group: String,
    pub account_name: String,
    pub location: String,
    pub sku: AccountSku,
    pub kind: AccountKind,
    pub tags: HashMap<String, String>,
    /// SKU applied during the update step
    pub update_sku: AccountSku,
    /// Key regenerated during the rotation step
    pub regenerate_key_name: String,
    /// Skip the final delete, leaving the account in place
    pub keep_account: bool,
}

impl Default for LifecycleRequest {
    fn default() -> Self {
        Self {
            resource_group: "TestResourceGroup".to_string(),
            account_name: String::new(),
            location: "westus".to_string(),
            sku: AccountSku::StandardGrs,
            kind: AccountKind::StorageV2,
            tags: HashMap::new(),
            update_sku: AccountSku::StandardLrs,
            regenerate_key_name: "key1".to_string(),
            keep_account: false,
        }
    }
}

/// Outcome of a lifecycle run
#[derive(Debug, Clone, serde::Serialize)]
pub struct RunResult {
    pub run_id: Uuid,
    pub completed_steps: Vec<Step>,
    /// Final account state (post-update); None once deleted and for
    /// failed runs that never created it
    pub account: Option<StorageAccountProperties>,
    /// Key set as of the rotation step
    pub keys: Vec<StorageAccountKey>,
    pub group_account_count: usize,
    pub subscription_account_count: usize,
    pub deleted: bool,
}

/// Executes the full storage account lifecycle against a
/// StorageOperations binding
pub struct LifecycleOrchestrator {
    auth_provider: Arc<dyn AzureAuthProvider>,
    storage_ops: Arc<dyn StorageOperations>,
    display_utils: DisplayUtils,
}

impl LifecycleOrchestrator {
    pub fn new(
        auth_provider: Arc<dyn AzureAuthProvider>,
        storage_ops: Arc<dyn StorageOperations>,
        no_color: bool,
    ) -> Self {
        Self {
            auth_provider,
            storage_ops,
            display_utils: DisplayUtils::new(no_color),
        }
    }

    /// Run the full lifecycle sequence.
    ///
    /// Each step completes before the next begins. The first error is
    /// wrapped with the failing step's name and halts the remainder.
    pub async fn run(&self, request: &LifecycleRequest) -> Result<RunResult> {
        let run_id = Uuid::new_v4();
        info!(%run_id, account = %request.account_name, "starting lifecycle run");

        let mut result = RunResult {
            run_id,
            completed_steps: Vec::new(),
            account: None,
            keys: Vec::new(),
            group_account_count: 0,
            subscription_account_count: 0,
            deleted: false,
        };

        // Step 1: acquire a management token before any resource call
        self.progress("Authenticating...")?;
        let token = self
            .auth_provider
            .get_token(&[MANAGEMENT_SCOPE])
            .await
            .map_err(|e| Self::fail(Step::Authenticate, e))?;
        if token.token.secret().is_empty() {
            return Err(Self::fail(
                Step::Authenticate,
                SactlError::authentication("Credential provider returned an empty token"),
            ));
        }
        result.completed_steps.push(Step::Authenticate);

        // Step 2: provider registration is idempotent on the ARM side
        self.progress("Registering the Microsoft.Storage provider...")?;
        let registration = self
            .storage_ops
            .register_provider()
            .await
            .map_err(|e| Self::fail(Step::RegisterProvider, e))?;
        info!(state = %registration.registration_state, "provider registration");
        result.completed_steps.push(Step::RegisterProvider);

        // Step 3: create-or-update the resource group
        self.progress(&format!(
            "Creating resource group '{}'...",
            request.resource_group
        ))?;
        self.storage_ops
            .upsert_resource_group(&request.resource_group, &request.location)
            .await
            .map_err(|e| Self::fail(Step::UpsertResourceGroup, e))?;
        result.completed_steps.push(Step::UpsertResourceGroup);

        // Step 4: name availability, then create-or-update the account
        self.progress(&format!(
            "Creating storage account '{}'...",
            request.account_name
        ))?;
        let availability = self
            .storage_ops
            .check_name_availability(&request.account_name)
            .await
            .map_err(|e| Self::fail(Step::CreateAccount, e))?;
        if !availability.name_available {
            return Err(Self::fail(
                Step::CreateAccount,
                SactlError::name_unavailable(
                    request.account_name.clone(),
                    availability
                        .message
                        .unwrap_or_else(|| "name already taken".to_string()),
                ),
            ));
        }

        let create_request = AccountCreateRequest {
            name: request.account_name.clone(),
            resource_group: request.resource_group.clone(),
            location: request.location.clone(),
            sku: request.sku,
            kind: request.kind,
            tags: request.tags.clone(),
        };
        let created = self
            .storage_ops
            .upsert_account(&create_request)
            .await
            .map_err(|e| Self::fail(Step::CreateAccount, e))?;
        info!(account = %created.name, sku = %created.sku, "storage account created");
        result.account = Some(created);
        result.completed_steps.push(Step::CreateAccount);

        // Step 5: read-back queries at all three scopes
        self.progress("Reading back account properties and listings...")?;
        let account = self
            .storage_ops
            .get_account(&request.resource_group, &request.account_name)
            .await
            .map_err(|e| Self::fail(Step::Inspect, e))?;
        let group_accounts = self
            .storage_ops
            .list_accounts(Some(&request.resource_group))
            .await
            .map_err(|e| Self::fail(Step::Inspect, e))?;
        let subscription_accounts = self
            .storage_ops
            .list_accounts(None)
            .await
            .map_err(|e| Self::fail(Step::Inspect, e))?;
        result.account = Some(account);
        result.group_account_count = group_accounts.len();
        result.subscription_account_count = subscription_accounts.len();
        result.completed_steps.push(Step::Inspect);

        // Step 6: fetch keys, then regenerate one named key
        self.progress(&format!(
            "Rotating key '{}'...",
            request.regenerate_key_name
        ))?;
        let keys_before = self
            .storage_ops
            .list_keys(&request.resource_group, &request.account_name)
            .await
            .map_err(|e| Self::fail(Step::RotateKeys, e))?;
        let keys_after = self
            .storage_ops
            .regenerate_key(
                &request.resource_group,
                &request.account_name,
                &request.regenerate_key_name,
            )
            .await
            .map_err(|e| Self::fail(Step::RotateKeys, e))?;
        if keys_after.len() != keys_before.len() {
            warn!(
                before = keys_before.len(),
                after = keys_after.len(),
                "key set size changed across regeneration"
            );
        }
        result.keys = keys_after;
        result.completed_steps.push(Step::RotateKeys);

        // Step 7: in-place SKU update; the operations layer merges the
        // live descriptor so other attributes survive
        self.progress(&format!("Updating SKU to {}...", request.update_sku))?;
        let update_request = AccountUpdateRequest {
            sku: Some(request.update_sku),
            tags: None,
        };
        let updated = self
            .storage_ops
            .update_account(
                &request.resource_group,
                &request.account_name,
                &update_request,
            )
            .await
            .map_err(|e| Self::fail(Step::UpdateAccount, e))?;
        info!(sku = %updated.sku, "storage account updated");
        result.account = Some(updated);
        result.completed_steps.push(Step::UpdateAccount);

        // Step 8: tolerant teardown; deleting an account that is already
        // gone counts as success
        if request.keep_account {
            self.progress("Keeping the storage account (delete skipped)")?;
        } else {
            self.progress(&format!(
                "Deleting storage account '{}'...",
                request.account_name
            ))?;
            match self
                .storage_ops
                .delete_account(&request.resource_group, &request.account_name)
                .await
            {
                Ok(()) => {}
                Err(SactlError::AccountNotFound { name }) => {
                    warn!(account = %name, "account already absent during delete");
                }
                Err(e) => return Err(Self::fail(Step::DeleteAccount, e)),
            }
            result.deleted = true;
            result.completed_steps.push(Step::DeleteAccount);
        }

        info!(%run_id, steps = result.completed_steps.len(), "lifecycle run completed");
        Ok(result)
    }

    fn fail(step: Step, source: SactlError) -> SactlError {
        SactlError::step_failed(step.to_string(), source)
    }

    fn progress(&self, message: &str) -> Result<()> {
        self.display_utils.print_info(message)
    }
}
