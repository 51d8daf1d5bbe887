//! Shared utilities for the self-care ERP integration crates.
//!
//! - [`time`]: clock abstraction with a controllable mock for tests
//! - [`cache`]: thread-safe key/value store with per-entry TTL and passive
//!   expiry

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod cache;
pub mod time;

pub use cache::{CacheStats, TtlCache};
pub use time::{Clock, MockClock, SystemClock};
