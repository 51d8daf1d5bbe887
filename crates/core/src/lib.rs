//! # Selfcare Core
//!
//! Pure integration logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - The `ErpAdapter` port every ERP backend implements
//! - Normalization of raw ERP payloads into domain records
//! - Deterministic read-cache keys
//! - The job model and its retry policy
//!
//! ## Architecture Principles
//! - Only depends on `selfcare-domain`
//! - No HTTP, no clocks, no spawning
//! - All external dependencies via traits

pub mod cache_keys;
pub mod jobs;
pub mod normalize;
pub mod ports;

pub use jobs::{ErpJob, JobId, JobKind, JobSnapshot, JobState, RetryDecision, RetryPolicy};
pub use normalize::{normalize_customer, normalize_invoice, normalize_payment};
pub use ports::ErpAdapter;
