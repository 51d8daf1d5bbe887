//! # Selfcare Domain
//!
//! Provider-agnostic data types for the ERP integration layer.
//!
//! This crate contains:
//! - Normalized DTOs (`Customer`, `Invoice`, `Payment`) and their enums
//! - Invoice listing filters
//! - The closed set of ERP providers
//! - The error taxonomy and `Result` alias
//! - Configuration structures and defaults
//!
//! ## Architecture
//! - No dependencies on other workspace crates
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
