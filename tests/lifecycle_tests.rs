//! Lifecycle orchestrator tests
//!
//! These tests drive the orchestrator against a mocked storage
//! operations binding to verify step ordering, halt-on-error behavior,
//! the tolerant delete policy, and key rotation invariants.

use async_trait::async_trait;
use azure_core::auth::{AccessToken, Secret};
use mockall::mock;
use mockall::Sequence;
use std::collections::HashMap;
use std::sync::Arc;
use time::OffsetDateTime;

use sactl::auth::provider::AzureAuthProvider;
use sactl::error::{Result, SactlError};
use sactl::storage::models::{
    AccountCreateRequest, AccountKind, AccountSku, AccountSummary, AccountUpdateRequest,
    NameAvailability, ProviderRegistration, ResourceGroup, StorageAccountKey,
    StorageAccountProperties,
};
use sactl::storage::operations::StorageOperations;
use sactl::storage::{LifecycleOrchestrator, LifecycleRequest, Step};

mock! {
    pub StorageOps {}

    #[async_trait]
    impl StorageOperations for StorageOps {
        async fn register_provider(&self) -> Result<ProviderRegistration>;
        async fn upsert_resource_group(&self, name: &str, location: &str) -> Result<ResourceGroup>;
        async fn check_name_availability(&self, name: &str) -> Result<NameAvailability>;
        async fn upsert_account(
            &self,
            request: &AccountCreateRequest,
        ) -> Result<StorageAccountProperties>;
        async fn get_account(
            &self,
            resource_group: &str,
            account_name: &str,
        ) -> Result<StorageAccountProperties>;
        async fn list_accounts<'s, 'a>(&'s self, resource_group: Option<&'a str>) -> Result<Vec<AccountSummary>>;
        async fn list_keys(
            &self,
            resource_group: &str,
            account_name: &str,
        ) -> Result<Vec<StorageAccountKey>>;
        async fn regenerate_key(
            &self,
            resource_group: &str,
            account_name: &str,
            key_name: &str,
        ) -> Result<Vec<StorageAccountKey>>;
        async fn update_account(
            &self,
            resource_group: &str,
            account_name: &str,
            request: &AccountUpdateRequest,
        ) -> Result<StorageAccountProperties>;
        async fn delete_account(&self, resource_group: &str, account_name: &str) -> Result<()>;
    }
}

/// Auth provider returning a fixed token without touching the network
struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
        }
    }
}

#[async_trait]
impl AzureAuthProvider for StaticTokenProvider {
    async fn get_token(&self, _scopes: &[&str]) -> Result<AccessToken> {
        Ok(AccessToken::new(
            Secret::new(self.token.clone()),
            OffsetDateTime::now_utc() + time::Duration::hours(1),
        ))
    }

    fn tenant_id(&self) -> Option<String> {
        None
    }

    fn client_id(&self) -> Option<String> {
        None
    }
}

const GROUP: &str = "TestResourceGroup";
const ACCOUNT: &str = "storagesample1a2b3c4d";

fn sample_request() -> LifecycleRequest {
    let mut tags = HashMap::new();
    tags.insert("key1".to_string(), "value1".to_string());
    tags.insert("key2".to_string(), "value2".to_string());

    LifecycleRequest {
        resource_group: GROUP.to_string(),
        account_name: ACCOUNT.to_string(),
        location: "westus".to_string(),
        sku: AccountSku::StandardGrs,
        kind: AccountKind::StorageV2,
        tags,
        update_sku: AccountSku::StandardLrs,
        regenerate_key_name: "key1".to_string(),
        keep_account: false,
    }
}

fn sample_account(sku: AccountSku) -> StorageAccountProperties {
    let mut tags = HashMap::new();
    tags.insert("key1".to_string(), "value1".to_string());
    tags.insert("key2".to_string(), "value2".to_string());

    StorageAccountProperties {
        id: format!(
            "/subscriptions/sub/resourceGroups/{}/providers/Microsoft.Storage/storageAccounts/{}",
            GROUP, ACCOUNT
        ),
        name: ACCOUNT.to_string(),
        resource_group: GROUP.to_string(),
        subscription_id: "sub".to_string(),
        location: "westus".to_string(),
        sku,
        kind: AccountKind::StorageV2,
        provisioning_state: "Succeeded".to_string(),
        creation_time: None,
        tags,
    }
}

fn sample_keys(key1_value: &str) -> Vec<StorageAccountKey> {
    vec![
        StorageAccountKey {
            key_name: "key1".to_string(),
            value: key1_value.to_string(),
            permissions: Some("FULL".to_string()),
        },
        StorageAccountKey {
            key_name: "key2".to_string(),
            value: "original-key2".to_string(),
            permissions: Some("FULL".to_string()),
        },
    ]
}

fn registered_provider() -> ProviderRegistration {
    ProviderRegistration {
        namespace: "Microsoft.Storage".to_string(),
        registration_state: "Registered".to_string(),
    }
}

fn ready_group() -> ResourceGroup {
    ResourceGroup {
        id: format!("/subscriptions/sub/resourceGroups/{}", GROUP),
        name: GROUP.to_string(),
        location: "westus".to_string(),
        provisioning_state: "Succeeded".to_string(),
    }
}

fn available() -> NameAvailability {
    NameAvailability {
        name_available: true,
        reason: None,
        message: None,
    }
}

fn orchestrator(mock: MockStorageOps) -> LifecycleOrchestrator {
    LifecycleOrchestrator::new(
        Arc::new(StaticTokenProvider::new("management-token")),
        Arc::new(mock),
        true,
    )
}

#[tokio::test]
async fn full_run_completes_every_step_in_order() {
    let mut mock = MockStorageOps::new();
    let mut seq = Sequence::new();

    mock.expect_register_provider()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(registered_provider()));

    mock.expect_upsert_resource_group()
        .withf(|name, location| name == GROUP && location == "westus")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(ready_group()));

    mock.expect_check_name_availability()
        .withf(|name| name == ACCOUNT)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(available()));

    mock.expect_upsert_account()
        .withf(|request| {
            request.name == ACCOUNT
                && request.sku == AccountSku::StandardGrs
                && request.kind == AccountKind::StorageV2
                && request.tags.len() == 2
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(sample_account(AccountSku::StandardGrs)));

    mock.expect_get_account()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(sample_account(AccountSku::StandardGrs)));

    mock.expect_list_accounts()
        .withf(|rg: &Option<&str>| *rg == Some(GROUP))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(vec![sample_account(AccountSku::StandardGrs).to_summary()]));

    mock.expect_list_accounts()
        .withf(|rg: &Option<&str>| rg.is_none())
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(vec![sample_account(AccountSku::StandardGrs).to_summary()]));

    mock.expect_list_keys()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(sample_keys("original-key1")));

    mock.expect_regenerate_key()
        .withf(|_, _, key| key == "key1")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(sample_keys("regenerated-key1")));

    mock.expect_update_account()
        .withf(|_, _, request| {
            request.sku == Some(AccountSku::StandardLrs) && request.tags.is_none()
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(sample_account(AccountSku::StandardLrs)));

    mock.expect_delete_account()
        .withf(|rg, name| rg == GROUP && name == ACCOUNT)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));

    let result = orchestrator(mock).run(&sample_request()).await.unwrap();

    assert_eq!(
        result.completed_steps,
        vec![
            Step::Authenticate,
            Step::RegisterProvider,
            Step::UpsertResourceGroup,
            Step::CreateAccount,
            Step::Inspect,
            Step::RotateKeys,
            Step::UpdateAccount,
            Step::DeleteAccount,
        ]
    );

    // Final account state reflects the update step
    let account = result.account.unwrap();
    assert_eq!(account.sku, AccountSku::StandardLrs);
    assert_eq!(account.kind, AccountKind::StorageV2);
    assert_eq!(account.tags.len(), 2);

    // Key rotation kept the set size and refreshed the named key
    assert_eq!(result.keys.len(), 2);
    assert_eq!(result.keys[0].value, "regenerated-key1");
    assert_eq!(result.keys[1].value, "original-key2");

    assert_eq!(result.group_account_count, 1);
    assert_eq!(result.subscription_account_count, 1);
    assert!(result.deleted);
}

#[tokio::test]
async fn empty_token_halts_before_any_remote_call() {
    // No expectations: any storage call would panic the mock
    let mock = MockStorageOps::new();
    let orchestrator = LifecycleOrchestrator::new(
        Arc::new(StaticTokenProvider::new("")),
        Arc::new(mock),
        true,
    );

    let err = orchestrator.run(&sample_request()).await.unwrap_err();

    match err {
        SactlError::StepFailed { step, source } => {
            assert_eq!(step, "authenticate");
            assert!(matches!(*source, SactlError::AuthenticationError(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn group_failure_halts_the_remaining_sequence() {
    let mut mock = MockStorageOps::new();

    mock.expect_register_provider()
        .times(1)
        .returning(|| Ok(registered_provider()));

    mock.expect_upsert_resource_group()
        .times(1)
        .returning(|_, _| Err(SactlError::azure_api("HTTP 403 [AuthorizationFailed]: denied")));

    // No further expectations: a call past the failed step panics

    let err = orchestrator(mock).run(&sample_request()).await.unwrap_err();

    match err {
        SactlError::StepFailed { step, source } => {
            assert_eq!(step, "upsert-resource-group");
            assert!(matches!(*source, SactlError::AzureApiError(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn taken_name_aborts_the_create_step() {
    let mut mock = MockStorageOps::new();

    mock.expect_register_provider()
        .times(1)
        .returning(|| Ok(registered_provider()));
    mock.expect_upsert_resource_group()
        .times(1)
        .returning(|_, _| Ok(ready_group()));

    mock.expect_check_name_availability()
        .times(1)
        .returning(|_| {
            Ok(NameAvailability {
                name_available: false,
                reason: Some("AlreadyExists".to_string()),
                message: Some("The storage account named is already taken.".to_string()),
            })
        });

    // upsert_account must never run

    let err = orchestrator(mock).run(&sample_request()).await.unwrap_err();

    match err {
        SactlError::StepFailed { step, source } => {
            assert_eq!(step, "create-account");
            assert!(matches!(*source, SactlError::NameUnavailable { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn delete_step_tolerates_missing_account() {
    let mut mock = MockStorageOps::new();

    mock.expect_register_provider()
        .returning(|| Ok(registered_provider()));
    mock.expect_upsert_resource_group()
        .returning(|_, _| Ok(ready_group()));
    mock.expect_check_name_availability()
        .returning(|_| Ok(available()));
    mock.expect_upsert_account()
        .returning(|_| Ok(sample_account(AccountSku::StandardGrs)));
    mock.expect_get_account()
        .returning(|_, _| Ok(sample_account(AccountSku::StandardGrs)));
    mock.expect_list_accounts().returning(|_| Ok(vec![]));
    mock.expect_list_keys()
        .returning(|_, _| Ok(sample_keys("original-key1")));
    mock.expect_regenerate_key()
        .returning(|_, _, _| Ok(sample_keys("regenerated-key1")));
    mock.expect_update_account()
        .returning(|_, _, _| Ok(sample_account(AccountSku::StandardLrs)));

    // The account vanished before teardown; the run still completes
    mock.expect_delete_account()
        .times(1)
        .returning(|_, name| Err(SactlError::account_not_found(name)));

    let result = orchestrator(mock).run(&sample_request()).await.unwrap();

    assert!(result.deleted);
    assert!(result.completed_steps.contains(&Step::DeleteAccount));
}

#[tokio::test]
async fn keep_account_skips_the_delete_step() {
    let mut mock = MockStorageOps::new();

    mock.expect_register_provider()
        .returning(|| Ok(registered_provider()));
    mock.expect_upsert_resource_group()
        .returning(|_, _| Ok(ready_group()));
    mock.expect_check_name_availability()
        .returning(|_| Ok(available()));
    mock.expect_upsert_account()
        .returning(|_| Ok(sample_account(AccountSku::StandardGrs)));
    mock.expect_get_account()
        .returning(|_, _| Ok(sample_account(AccountSku::StandardGrs)));
    mock.expect_list_accounts().returning(|_| Ok(vec![]));
    mock.expect_list_keys()
        .returning(|_, _| Ok(sample_keys("original-key1")));
    mock.expect_regenerate_key()
        .returning(|_, _, _| Ok(sample_keys("regenerated-key1")));
    mock.expect_update_account()
        .returning(|_, _, _| Ok(sample_account(AccountSku::StandardLrs)));

    // delete_account must never run

    let mut request = sample_request();
    request.keep_account = true;

    let result = orchestrator(mock).run(&request).await.unwrap();

    assert!(!result.deleted);
    assert!(!result.completed_steps.contains(&Step::DeleteAccount));
    assert_eq!(result.completed_steps.last(), Some(&Step::UpdateAccount));
}

#[tokio::test]
async fn repeated_rotation_produces_distinct_values_with_constant_set_size() {
    let mut mock = MockStorageOps::new();

    let mut counter = 0u32;
    mock.expect_regenerate_key()
        .times(2)
        .returning(move |_, _, _| {
            counter += 1;
            Ok(sample_keys(&format!("rotated-{counter}")))
        });

    let ops: Arc<dyn StorageOperations> = Arc::new(mock);

    let first = ops.regenerate_key(GROUP, ACCOUNT, "key1").await.unwrap();
    let second = ops.regenerate_key(GROUP, ACCOUNT, "key1").await.unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
    assert_ne!(first[0].value, second[0].value);
    assert_eq!(first[1].value, second[1].value);
}
