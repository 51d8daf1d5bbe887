//! Error types used throughout the integration layer

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of transient adapter failures.
///
/// Every kind is retryable; the category exists for logging and for telling
/// an operator *why* the ERP was unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterErrorKind {
    /// Connection refused or host unreachable
    NetworkOffline,

    /// Request exceeded the configured timeout
    NetworkTimeout,

    /// ERP answered with a 5xx status
    ServerUnavailable,

    /// Credentials rejected (401, 403) or missing token
    Authentication,

    /// ERP throttled the request (429)
    RateLimited,

    /// Transport failure that fits none of the above
    Unknown,
}

impl fmt::Display for AdapterErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkOffline => write!(f, "network offline"),
            Self::NetworkTimeout => write!(f, "network timeout"),
            Self::ServerUnavailable => write!(f, "server unavailable"),
            Self::Authentication => write!(f, "authentication failed"),
            Self::RateLimited => write!(f, "rate limited"),
            Self::Unknown => write!(f, "transport error"),
        }
    }
}

/// Main error type for the ERP integration layer
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ErpError {
    /// Transient failure talking to the ERP. Retryable.
    #[error("ERP adapter error ({kind}): {message}")]
    Adapter { kind: AdapterErrorKind, message: String },

    /// The ERP (or a caller) supplied data of an unexpected shape.
    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },

    /// The ERP refused the request with a non-transient 4xx status.
    #[error("ERP rejected request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// Provider name does not resolve to a known adapter.
    #[error("Unknown ERP provider: {name}")]
    UnknownProvider { name: String },

    /// A job used its whole retry budget on transient failures.
    #[error("Attempts exhausted after {attempts} tries: {last_error}")]
    AttemptsExhausted { attempts: u32, last_error: Box<ErpError> },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ErpError {
    /// Build a transient adapter error.
    pub fn adapter(kind: AdapterErrorKind, message: impl Into<String>) -> Self {
        Self::Adapter { kind, message: message.into() }
    }

    /// Build a malformed-payload error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPayload { message: message.into() }
    }

    /// Build an unknown-provider error.
    pub fn unknown_provider(name: impl Into<String>) -> Self {
        Self::UnknownProvider { name: name.into() }
    }

    /// Build a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Build an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Only adapter errors are worth another attempt; retrying will not fix
    /// bad data, a rejected request, or misconfiguration.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Adapter { .. })
    }

    /// Adapter error category, when this is an adapter error.
    pub fn adapter_kind(&self) -> Option<AdapterErrorKind> {
        match self {
            Self::Adapter { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Stable label suitable for structured logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Adapter { .. } => "adapter",
            Self::MalformedPayload { .. } => "malformed_payload",
            Self::Rejected { .. } => "rejected",
            Self::UnknownProvider { .. } => "unknown_provider",
            Self::AttemptsExhausted { .. } => "attempts_exhausted",
            Self::Config { .. } => "config",
            Self::Internal { .. } => "internal",
        }
    }
}

/// Result type alias for integration-layer operations
pub type Result<T> = std::result::Result<T, ErpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_adapter_errors_are_retryable() {
        assert!(ErpError::adapter(AdapterErrorKind::NetworkTimeout, "slow").is_retryable());
        assert!(ErpError::adapter(AdapterErrorKind::Authentication, "401").is_retryable());
        assert!(!ErpError::malformed("missing name").is_retryable());
        assert!(!ErpError::Rejected { status: 422, message: "bad".into() }.is_retryable());
        assert!(!ErpError::unknown_provider("sap").is_retryable());
        assert!(!ErpError::config("no url").is_retryable());
    }

    #[test]
    fn attempts_exhausted_displays_last_error() {
        let err = ErpError::AttemptsExhausted {
            attempts: 5,
            last_error: Box::new(ErpError::adapter(AdapterErrorKind::ServerUnavailable, "HTTP 503")),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("5 tries"));
        assert!(rendered.contains("server unavailable"));
        assert_eq!(err.label(), "attempts_exhausted");
        assert!(!err.is_retryable());
    }

    #[test]
    fn serializes_with_type_tag() {
        let err = ErpError::unknown_provider("sap");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "unknown_provider");
        assert_eq!(json["name"], "sap");
    }
}
