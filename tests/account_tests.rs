//! Account model and helper tests
//!
//! Covers the SKU/kind wire formats, Azure naming validation, and the
//! account summary conversion.

use std::collections::HashMap;

use sactl::storage::models::{
    AccountKind, AccountSku, ProviderRegistration, StorageAccountProperties,
};
use sactl::storage::operations::account_resource_id;
use sactl::utils::helpers::{is_guid, validate_account_name, validate_resource_group_name};

#[test]
fn sku_round_trips_through_wire_names() {
    assert_eq!(AccountSku::StandardGrs.to_string(), "Standard_GRS");
    assert_eq!(AccountSku::StandardLrs.to_string(), "Standard_LRS");
    assert_eq!(AccountSku::PremiumLrs.to_string(), "Premium_LRS");

    assert_eq!(
        serde_json::to_string(&AccountSku::StandardGrs).unwrap(),
        "\"Standard_GRS\""
    );
    assert_eq!(
        serde_json::from_str::<AccountSku>("\"Standard_RAGRS\"").unwrap(),
        AccountSku::StandardRagrs
    );

    assert_eq!(AccountSku::StandardGzrs.to_string(), "Standard_GZRS");
    assert_eq!(
        serde_json::from_str::<AccountSku>("\"Standard_RAGZRS\"").unwrap(),
        AccountSku::StandardRagzrs
    );
    assert_eq!(
        "premium_zrs".parse::<AccountSku>().unwrap(),
        AccountSku::PremiumZrs
    );

    // FromStr is tolerant of case and hyphen/underscore variants
    assert_eq!(
        "standard-lrs".parse::<AccountSku>().unwrap(),
        AccountSku::StandardLrs
    );
    assert_eq!(
        "Standard_ZRS".parse::<AccountSku>().unwrap(),
        AccountSku::StandardZrs
    );
    assert!("Standard_XYZ".parse::<AccountSku>().is_err());
}

#[test]
fn kind_round_trips_through_wire_names() {
    assert_eq!(AccountKind::StorageV2.to_string(), "StorageV2");
    assert_eq!(
        serde_json::to_string(&AccountKind::BlockBlobStorage).unwrap(),
        "\"BlockBlobStorage\""
    );
    assert_eq!(
        "blobstorage".parse::<AccountKind>().unwrap(),
        AccountKind::BlobStorage
    );
    assert!("TableStorage".parse::<AccountKind>().is_err());
}

#[test]
fn account_name_validation_enforces_azure_rules() {
    assert!(validate_account_name("abc").is_ok());
    assert!(validate_account_name("storagesample1a2b3c4d").is_ok());
    assert!(validate_account_name("a23456789012345678901234").is_ok());

    assert!(validate_account_name("ab").is_err());
    assert!(validate_account_name("a234567890123456789012345").is_err());
    assert!(validate_account_name("Uppercase1").is_err());
    assert!(validate_account_name("has-hyphen").is_err());
    assert!(validate_account_name("has_underscore").is_err());
}

#[test]
fn resource_group_validation_enforces_azure_rules() {
    assert!(validate_resource_group_name("TestResourceGroup").is_ok());
    assert!(validate_resource_group_name("rg-prod_1.(east)").is_ok());

    assert!(validate_resource_group_name("").is_err());
    assert!(validate_resource_group_name(&"x".repeat(91)).is_err());
    assert!(validate_resource_group_name("ends-with-period.").is_err());
    assert!(validate_resource_group_name("has spaces").is_err());
}

#[test]
fn guid_detection() {
    assert!(is_guid("c63fb1f6-9e43-4c32-9df3-04b38deed9a6"));
    assert!(!is_guid("not-a-guid"));
    assert!(!is_guid(""));
}

#[test]
fn summary_conversion_renders_wire_names() {
    let mut tags = HashMap::new();
    tags.insert("key1".to_string(), "value1".to_string());

    let account = StorageAccountProperties {
        id: account_resource_id("sub-id", "TestResourceGroup", "storagesample00000000"),
        name: "storagesample00000000".to_string(),
        resource_group: "TestResourceGroup".to_string(),
        subscription_id: "sub-id".to_string(),
        location: "westus".to_string(),
        sku: AccountSku::StandardGrs,
        kind: AccountKind::StorageV2,
        provisioning_state: "Succeeded".to_string(),
        creation_time: None,
        tags,
    };

    let summary = account.to_summary();
    assert_eq!(summary.name, "storagesample00000000");
    assert_eq!(summary.resource_group, "TestResourceGroup");
    assert_eq!(summary.sku, "Standard_GRS");
    assert_eq!(summary.kind, "StorageV2");
    assert_eq!(summary.provisioning_state, "Succeeded");
}

#[test]
fn provider_registration_state_check_is_case_insensitive() {
    let registered = ProviderRegistration {
        namespace: "Microsoft.Storage".to_string(),
        registration_state: "Registered".to_string(),
    };
    let pending = ProviderRegistration {
        namespace: "Microsoft.Storage".to_string(),
        registration_state: "Registering".to_string(),
    };

    assert!(registered.is_registered());
    assert!(!pending.is_registered());
}
