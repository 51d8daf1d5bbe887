//! # Self-care ERP Infrastructure
//!
//! Concrete implementations behind the ports in `selfcare-core`.
//!
//! This crate contains:
//! - The HTTP client and the ERPNext adapter
//! - The in-memory mock adapter
//! - The provider registry
//! - The read-through cache and the `ErpService` read facade
//! - The retrying job queue and its failure sinks
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements traits defined in `selfcare-core`
//! - Depends on `selfcare-common`, `selfcare-domain` and `selfcare-core`
//! - Contains all "impure" code (network, clocks, background tasks)

pub mod config;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod jobs;
pub mod observability;
pub mod registry;
pub mod services;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use integrations::{ErpNextAdapter, MockErpAdapter, MockFailure, MockOperation};
pub use jobs::{
    FailedJob, FailureSink, JobQueue, JobQueueOptions, JobRunner, RecordingFailureSink,
    TracingFailureSink,
};
pub use observability::{init_tracing, LogFormat};
pub use registry::{AdapterFactory, ProviderRegistry, ProviderRegistryBuilder};
pub use services::{CachedRecord, ErpReadCache, ErpService};
