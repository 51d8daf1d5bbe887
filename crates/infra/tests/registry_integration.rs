//! Integration tests for provider resolution.

use std::sync::Arc;

use selfcare_domain::{ErpConfig, ErpError, ProviderKind};
use selfcare_infra::registry::ProviderRegistry;

#[tokio::test]
async fn test_mock_driver_is_shared() {
    let registry = ProviderRegistry::new(ErpConfig::default());

    let first = registry.driver(Some("mock")).expect("mock resolves");
    let second = registry.driver(Some("mock")).expect("mock resolves");
    assert!(Arc::ptr_eq(&first, &second));

    assert!(first.authenticate().await.expect("mock authenticates"));
    assert!(second.is_authenticated());
}

#[test]
fn test_unknown_driver_fails_without_construction() {
    let registry = ProviderRegistry::new(ErpConfig::default());

    let err = registry.driver(Some("unknown")).err().expect("unknown provider");
    assert!(matches!(err, ErpError::UnknownProvider { .. }));
    assert!(ProviderKind::ALL.iter().all(|kind| !registry.is_constructed(*kind)));
}

#[test]
fn test_erpnext_driver_built_from_config() {
    let config = ErpConfig {
        provider: ProviderKind::ErpNext,
        base_url: Some("http://127.0.0.1:9".into()),
        api_key: Some("key".into()),
        api_secret: Some("secret".into()),
        ..ErpConfig::default()
    };
    let registry = ProviderRegistry::new(config);

    let adapter = registry.driver(None).expect("erpnext resolves");
    assert_eq!(adapter.provider(), ProviderKind::ErpNext);
    assert!(!adapter.is_authenticated());
}
