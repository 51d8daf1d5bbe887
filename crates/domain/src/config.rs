//! Configuration structures for the integration layer

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ATTEMPT_TIMEOUT_SECS, DEFAULT_CACHE_TTL_SECS, DEFAULT_ERP_TIMEOUT_SECS,
    DEFAULT_JOB_WORKERS,
};
use crate::{ErpError, ProviderKind, Result};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub erp: ErpConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub jobs: JobQueueConfig,
}

impl AppConfig {
    /// Check cross-field requirements.
    ///
    /// # Errors
    /// Returns `ErpError::Config` when the live provider is selected without a
    /// base URL or credentials, or when the queue has no workers.
    pub fn validate(&self) -> Result<()> {
        self.erp.validate()?;
        if self.jobs.workers == 0 {
            return Err(ErpError::config("jobs.workers must be at least 1"));
        }
        if self.jobs.attempt_timeout_secs == 0 {
            return Err(ErpError::config("jobs.attempt_timeout_secs must be at least 1"));
        }
        Ok(())
    }
}

/// ERP connection settings
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ErpConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_secret: Option<String>,
    /// Company used when asking the ERP for a customer balance
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default = "default_erp_timeout")]
    pub timeout_secs: u64,
}

impl Default for ErpConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            base_url: None,
            api_key: None,
            api_secret: None,
            company: None,
            timeout_secs: DEFAULT_ERP_TIMEOUT_SECS,
        }
    }
}

impl ErpConfig {
    fn validate(&self) -> Result<()> {
        if self.provider != ProviderKind::ErpNext {
            return Ok(());
        }
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        if !present(&self.base_url) {
            return Err(ErpError::config("erp.base_url is required for the erpnext provider"));
        }
        if !present(&self.api_key) || !present(&self.api_secret) {
            return Err(ErpError::config(
                "erp.api_key and erp.api_secret are required for the erpnext provider",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ErpError::config("erp.timeout_secs must be at least 1"));
        }
        Ok(())
    }
}

// Credentials stay out of logs.
impl fmt::Debug for ErpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErpConfig")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_secret", &self.api_secret.as_ref().map(|_| "[REDACTED]"))
            .field("company", &self.company)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Read-cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Zero disables caching.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: DEFAULT_CACHE_TTL_SECS }
    }
}

/// Background job queue settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobQueueConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_secs: u64,
}

impl Default for JobQueueConfig {
    fn default() -> Self {
        Self { workers: DEFAULT_JOB_WORKERS, attempt_timeout_secs: DEFAULT_ATTEMPT_TIMEOUT_SECS }
    }
}

fn default_erp_timeout() -> u64 {
    DEFAULT_ERP_TIMEOUT_SECS
}

fn default_cache_ttl() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

fn default_workers() -> usize {
    DEFAULT_JOB_WORKERS
}

fn default_attempt_timeout() -> u64 {
    DEFAULT_ATTEMPT_TIMEOUT_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live() -> ErpConfig {
        ErpConfig {
            provider: ProviderKind::ErpNext,
            base_url: Some("https://erp.example.com".into()),
            api_key: Some("key".into()),
            api_secret: Some("secret".into()),
            ..ErpConfig::default()
        }
    }

    #[test]
    fn defaults_select_mock_provider() {
        let config = AppConfig::default();
        assert_eq!(config.erp.provider, ProviderKind::Mock);
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.jobs.workers, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn erpnext_requires_url_and_credentials() {
        let mut config = AppConfig { erp: live(), ..AppConfig::default() };
        assert!(config.validate().is_ok());

        config.erp.api_secret = None;
        assert!(matches!(config.validate(), Err(ErpError::Config { .. })));

        config.erp = ErpConfig { base_url: Some("  ".into()), ..live() };
        assert!(matches!(config.validate(), Err(ErpError::Config { .. })));
    }

    #[test]
    fn zero_workers_is_rejected() {
        let config = AppConfig {
            jobs: JobQueueConfig { workers: 0, ..JobQueueConfig::default() },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_redacts_credentials() {
        let rendered = format!("{:?}", live());
        assert!(!rendered.contains("secret\""));
        assert!(!rendered.contains("\"key\""));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"erp": {"provider": "erpnext"}, "cache": {}}"#).unwrap();
        assert_eq!(config.erp.provider, ProviderKind::ErpNext);
        assert_eq!(config.erp.timeout_secs, 30);
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.jobs.attempt_timeout_secs, 120);
    }
}
