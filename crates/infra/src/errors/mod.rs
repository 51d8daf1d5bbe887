//! Infrastructure error plumbing.

mod conversions;

pub use conversions::{classify_status, InfraError};
