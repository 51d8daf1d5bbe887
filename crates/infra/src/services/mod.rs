//! Service layer implementations.
//!
//! Services put caching and provider resolution on top of the ERP adapters.

pub mod erp_service;
pub mod read_cache;

pub use erp_service::ErpService;
pub use read_cache::{CachedRecord, ErpReadCache};
