//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files and
//! wiring the result into the registry and cache.

use std::io::Write;
use std::time::Duration;

use selfcare_domain::ProviderKind;
use selfcare_infra::config;
use selfcare_infra::jobs::JobQueueOptions;
use selfcare_infra::registry::ProviderRegistry;
use selfcare_infra::services::ErpReadCache;
use tempfile::NamedTempFile;

fn write_temp(contents: &str, extension: &str) -> std::path::PathBuf {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");
    let path = temp_file.path().with_extension(extension);
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");
    path
}

#[test]
fn test_load_config_from_toml_file() {
    let path = write_temp(
        r#"
[erp]
provider = "mock"
timeout_secs = 15

[cache]
ttl_secs = 0

[jobs]
workers = 2
attempt_timeout_secs = 45
"#,
        "toml",
    );

    let config = config::load_from_file(Some(path.clone())).expect("config should load");
    std::fs::remove_file(path).ok();

    assert_eq!(config.erp.provider, ProviderKind::Mock);
    assert_eq!(config.erp.timeout_secs, 15);

    let cache = ErpReadCache::from_config(&config.cache);
    assert!(!cache.is_enabled());

    let options = JobQueueOptions::from(&config.jobs);
    assert_eq!(options.workers, 2);
    assert_eq!(options.attempt_timeout, Duration::from_secs(45));

    let registry = ProviderRegistry::new(config.erp);
    assert_eq!(registry.default_provider(), ProviderKind::Mock);
}

#[test]
fn test_load_config_from_json_file() {
    let path = write_temp(
        r#"{
            "erp": {
                "provider": "erpnext",
                "base_url": "https://erp.example.com",
                "api_key": "key",
                "api_secret": "secret",
                "company": "Heat Co"
            }
        }"#,
        "json",
    );

    let config = config::load_from_file(Some(path.clone())).expect("config should load");
    std::fs::remove_file(path).ok();

    assert_eq!(config.erp.provider, ProviderKind::ErpNext);
    assert_eq!(config.erp.company.as_deref(), Some("Heat Co"));
    assert_eq!(config.cache.ttl_secs, 300);

    let rendered = format!("{:?}", config.erp);
    assert!(rendered.contains("[REDACTED]"));
    assert!(!rendered.contains("\"secret\""));
}

#[test]
fn test_load_config_rejects_incomplete_erpnext() {
    let path = write_temp("[erp]\nprovider = \"erpnext\"\n", "toml");

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(path).ok();

    assert!(result.is_err(), "erpnext without base_url must be rejected");
}
