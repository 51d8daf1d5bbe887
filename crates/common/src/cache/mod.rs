//! Thread-safe key/value store with per-entry TTL.
//!
//! Entries carry their own deadline, chosen at insertion time. Expiry is
//! passive: an expired entry is dropped the next time it is read, and nothing
//! sweeps the map in the background.
//!
//! ```
//! use std::time::Duration;
//!
//! use selfcare_common::cache::TtlCache;
//!
//! let cache: TtlCache<String, i32> = TtlCache::new();
//! cache.put("key".to_string(), 42, Duration::from_secs(300));
//! assert_eq!(cache.get(&"key".to_string()), Some(42));
//! ```
//!
//! A zero TTL disables caching for that write: the value is not stored and
//! any previous entry under the key is dropped.

mod core;
mod stats;

pub use self::core::TtlCache;

pub use stats::CacheStats;
