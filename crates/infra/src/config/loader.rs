//! Configuration loader
//!
//! Loads the integration-layer configuration from environment variables or
//! files.
//!
//! ## Loading Strategy
//! 1. If `SELFCARE_ERP_PROVIDER` is set, everything comes from the environment
//! 2. Otherwise the first config file found by [`probe_config_paths`] is used
//! 3. With neither, built-in defaults apply (mock provider)
//!
//! The result is always validated before it is returned.
//!
//! ## Environment Variables
//! - `SELFCARE_ERP_PROVIDER`: `erpnext` or `mock`
//! - `SELFCARE_ERP_BASE_URL`: ERPNext base URL
//! - `SELFCARE_ERP_API_KEY` / `SELFCARE_ERP_API_SECRET`: token credentials
//! - `SELFCARE_ERP_COMPANY`: company used for balance queries
//! - `SELFCARE_ERP_TIMEOUT_SECS`: per-call timeout (default 30)
//! - `SELFCARE_CACHE_TTL_SECS`: read cache TTL, 0 disables (default 300)
//! - `SELFCARE_JOB_WORKERS`: job queue workers (default 4)
//! - `SELFCARE_JOB_ATTEMPT_TIMEOUT_SECS`: per-attempt bound (default 120)
//!
//! ## File Locations
//! `selfcare.toml`, `selfcare.json`, `config.toml`, `config.json`, looked up
//! in the working directory, its two parents, and next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use selfcare_domain::{
    AppConfig, CacheConfig, ErpConfig, ErpError, JobQueueConfig, ProviderKind, Result,
};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["selfcare.toml", "selfcare.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `ErpError::Config` if the selected source cannot be read or
/// parsed, or the resulting configuration fails validation.
pub fn load() -> Result<AppConfig> {
    if std::env::var_os("SELFCARE_ERP_PROVIDER").is_some() {
        let config = load_from_env()?;
        tracing::info!(
            provider = %config.erp.provider,
            "Configuration loaded from environment variables"
        );
        return Ok(config);
    }

    match probe_config_paths() {
        Some(path) => load_from_file(Some(path)),
        None => {
            tracing::info!("No configuration found; using defaults");
            let config = AppConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `SELFCARE_ERP_PROVIDER` is required; every other variable falls back
/// to its default.
///
/// # Errors
/// Returns `ErpError::Config` if the provider is missing or unknown, a
/// numeric variable does not parse, or validation fails.
pub fn load_from_env() -> Result<AppConfig> {
    let provider = env_var("SELFCARE_ERP_PROVIDER")?;
    let provider = ProviderKind::from_str(&provider)
        .map_err(|_| ErpError::config(format!("Unknown ERP provider: {provider}")))?;

    let erp_defaults = ErpConfig::default();
    let cache_defaults = CacheConfig::default();
    let jobs_defaults = JobQueueConfig::default();

    let config = AppConfig {
        erp: ErpConfig {
            provider,
            base_url: env_opt("SELFCARE_ERP_BASE_URL"),
            api_key: env_opt("SELFCARE_ERP_API_KEY"),
            api_secret: env_opt("SELFCARE_ERP_API_SECRET"),
            company: env_opt("SELFCARE_ERP_COMPANY"),
            timeout_secs: env_parse("SELFCARE_ERP_TIMEOUT_SECS")?
                .unwrap_or(erp_defaults.timeout_secs),
        },
        cache: CacheConfig {
            ttl_secs: env_parse("SELFCARE_CACHE_TTL_SECS")?.unwrap_or(cache_defaults.ttl_secs),
        },
        jobs: JobQueueConfig {
            workers: env_parse("SELFCARE_JOB_WORKERS")?.unwrap_or(jobs_defaults.workers),
            attempt_timeout_secs: env_parse("SELFCARE_JOB_ATTEMPT_TIMEOUT_SECS")?
                .unwrap_or(jobs_defaults.attempt_timeout_secs),
        },
    };
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Format is chosen by
/// extension (`.toml` or `.json`). Missing sections take their defaults.
///
/// # Errors
/// Returns `ErpError::Config` if no file is found, the file cannot be read
/// or parsed, or validation fails.
pub fn load_from_file(path: Option<PathBuf>) -> Result<AppConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ErpError::config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ErpError::config("No config file found in any of the standard locations")
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ErpError::config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

fn parse_config(contents: &str, path: &Path) -> Result<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ErpError::config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ErpError::config(format!("Invalid JSON format: {e}"))),
        _ => Err(ErpError::config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a config file
///
/// Returns the first existing candidate, or `None`.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend(cwd.ancestors().take(3).map(Path::to_path_buf));
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.is_file())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| ErpError::config(format!("Missing required environment variable: {key}")))
}

/// Optional variable; blank counts as unset.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| raw.parse::<T>().map_err(|e| ErpError::config(format!("Invalid {key}: {e}"))))
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: [&str; 9] = [
        "SELFCARE_ERP_PROVIDER",
        "SELFCARE_ERP_BASE_URL",
        "SELFCARE_ERP_API_KEY",
        "SELFCARE_ERP_API_SECRET",
        "SELFCARE_ERP_COMPANY",
        "SELFCARE_ERP_TIMEOUT_SECS",
        "SELFCARE_CACHE_TTL_SECS",
        "SELFCARE_JOB_WORKERS",
        "SELFCARE_JOB_ATTEMPT_TIMEOUT_SECS",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    fn write_config(contents: &str, extension: &str) -> PathBuf {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        path
    }

    #[test]
    fn test_load_from_env_erpnext() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("SELFCARE_ERP_PROVIDER", "ERPNext");
        std::env::set_var("SELFCARE_ERP_BASE_URL", "https://erp.example.com");
        std::env::set_var("SELFCARE_ERP_API_KEY", "key");
        std::env::set_var("SELFCARE_ERP_API_SECRET", "secret");
        std::env::set_var("SELFCARE_ERP_COMPANY", "Heat Co");
        std::env::set_var("SELFCARE_CACHE_TTL_SECS", "0");
        std::env::set_var("SELFCARE_JOB_WORKERS", "8");

        let config = load_from_env().unwrap();
        clear_env();

        assert_eq!(config.erp.provider, ProviderKind::ErpNext);
        assert_eq!(config.erp.base_url.as_deref(), Some("https://erp.example.com"));
        assert_eq!(config.erp.company.as_deref(), Some("Heat Co"));
        assert_eq!(config.erp.timeout_secs, 30);
        assert_eq!(config.cache.ttl_secs, 0);
        assert_eq!(config.jobs.workers, 8);
        assert_eq!(config.jobs.attempt_timeout_secs, 120);
    }

    #[test]
    fn test_load_from_env_requires_credentials_for_erpnext() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("SELFCARE_ERP_PROVIDER", "erpnext");
        std::env::set_var("SELFCARE_ERP_BASE_URL", "https://erp.example.com");

        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(ErpError::Config { .. })));
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("SELFCARE_ERP_PROVIDER", "mock");
        std::env::set_var("SELFCARE_JOB_WORKERS", "many");

        let err = load_from_env().unwrap_err();
        clear_env();

        assert!(err.to_string().contains("SELFCARE_JOB_WORKERS"));
    }

    #[test]
    fn test_load_from_env_unknown_provider() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("SELFCARE_ERP_PROVIDER", "sap");
        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(ErpError::Config { .. })));
    }

    #[test]
    fn test_load_from_env_missing_provider() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        assert!(matches!(load_from_env(), Err(ErpError::Config { .. })));
    }

    #[test]
    fn test_load_from_file_toml() {
        let path = write_config(
            r#"
[erp]
provider = "erpnext"
base_url = "https://erp.example.com"
api_key = "key"
api_secret = "secret"
timeout_secs = 10

[cache]
ttl_secs = 60
"#,
            "toml",
        );

        let config = load_from_file(Some(path.clone())).unwrap();
        std::fs::remove_file(path).ok();

        assert_eq!(config.erp.provider, ProviderKind::ErpNext);
        assert_eq!(config.erp.timeout_secs, 10);
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.jobs, JobQueueConfig::default());
    }

    #[test]
    fn test_load_from_file_json_defaults_missing_sections() {
        let path = write_config(r#"{ "jobs": { "workers": 2 } }"#, "json");

        let config = load_from_file(Some(path.clone())).unwrap();
        std::fs::remove_file(path).ok();

        assert_eq!(config.erp.provider, ProviderKind::Mock);
        assert_eq!(config.jobs.workers, 2);
        assert_eq!(config.cache.ttl_secs, 300);
    }

    #[test]
    fn test_load_from_file_rejects_zero_workers() {
        let path = write_config("[jobs]\nworkers = 0\n", "toml");

        let result = load_from_file(Some(path.clone()));
        std::fs::remove_file(path).ok();

        assert!(matches!(result, Err(ErpError::Config { .. })));
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/selfcare.toml")));
        assert!(matches!(result, Err(ErpError::Config { .. })));
    }

    #[test]
    fn test_parse_config_invalid_json() {
        let result = parse_config(r#"{ "erp": "#, Path::new("selfcare.json"));
        assert!(matches!(result, Err(ErpError::Config { .. })));
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("erp: {}", Path::new("selfcare.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }
}
