//! Integration-layer constants
//!
//! Reference configuration values shared by the normalizer, cache and job
//! runner.

// Read cache
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const CUSTOMER_CACHE_PREFIX: &str = "customer";
pub const INVOICES_CACHE_PREFIX: &str = "invoices";

// ERP transport
pub const DEFAULT_ERP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

// Job runner
pub const PAYMENT_JOB_MAX_ATTEMPTS: u32 = 5;
pub const PAYMENT_JOB_BACKOFF_SECS: [u64; 5] = [60, 300, 900, 1800, 3600];
pub const SYNC_JOB_MAX_ATTEMPTS: u32 = 3;
pub const SYNC_JOB_BACKOFF_SECS: [u64; 3] = [60, 300, 900];
pub const DEFAULT_JOB_WORKERS: usize = 4;
pub const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_JOIN_TIMEOUT_SECS: u64 = 5;
