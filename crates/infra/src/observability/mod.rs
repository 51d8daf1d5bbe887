//! Observability setup
//!
//! The crates emit `tracing` events with structured fields; this module only
//! installs a subscriber for binaries and tests that want output.

mod logging;

pub use logging::{init_tracing, LogFormat};
