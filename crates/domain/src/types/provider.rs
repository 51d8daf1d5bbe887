//! Closed set of ERP providers.

use serde::{Deserialize, Serialize};

use crate::errors::{ErpError, Result};
use crate::impl_domain_status_conversions;

/// ERP backends the registry knows how to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Live ERPNext instance over HTTP.
    ErpNext,
    /// Deterministic in-memory fixtures.
    #[default]
    Mock,
}

impl_domain_status_conversions!(ProviderKind {
    ErpNext => "erpnext",
    Mock => "mock",
});

impl ProviderKind {
    /// Every known provider.
    pub const ALL: [ProviderKind; 2] = [ProviderKind::ErpNext, ProviderKind::Mock];

    /// Resolve a configured provider name.
    ///
    /// # Errors
    /// Returns [`ErpError::UnknownProvider`] when `name` is not a known
    /// provider.
    pub fn parse(name: &str) -> Result<Self> {
        name.parse().map_err(|_| ErpError::unknown_provider(name))
    }
}
