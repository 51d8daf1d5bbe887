//! Conversions from transport errors into domain errors.
//!
//! Every transient failure becomes `ErpError::Adapter` with an
//! [`AdapterErrorKind`] so the job runner can retry it; everything the ERP
//! deliberately refused becomes `ErpError::Rejected`.

use reqwest::{Error as HttpError, StatusCode};
use selfcare_domain::{AdapterErrorKind, ErpError};
use thiserror::Error;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct InfraError(pub ErpError);

impl From<InfraError> for ErpError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ErpError> for InfraError {
    fn from(value: ErpError) -> Self {
        InfraError(value)
    }
}

impl From<HttpError> for InfraError {
    fn from(err: HttpError) -> Self {
        let mapped = if err.is_timeout() {
            ErpError::adapter(AdapterErrorKind::NetworkTimeout, format!("request timed out: {err}"))
        } else if err.is_connect() {
            ErpError::adapter(
                AdapterErrorKind::NetworkOffline,
                format!("failed to connect to ERP: {err}"),
            )
        } else if let Some(status) = err.status() {
            classify_status(status, &err.to_string())
        } else if err.is_decode() {
            ErpError::malformed(format!("failed to decode ERP response: {err}"))
        } else if err.is_builder() {
            ErpError::internal(format!("invalid HTTP request: {err}"))
        } else {
            ErpError::adapter(AdapterErrorKind::Unknown, format!("HTTP error: {err}"))
        };
        InfraError(mapped)
    }
}

/// Classify a non-success HTTP status.
///
/// Credentials, throttling, request timeouts and server faults are transient;
/// any other 4xx means the ERP refused this request and repeating it will not
/// help.
pub fn classify_status(status: StatusCode, detail: &str) -> ErpError {
    let message = format!(
        "HTTP {}: {}{}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown"),
        if detail.is_empty() { String::new() } else { format!(" ({detail})") }
    );
    match status.as_u16() {
        401 | 403 => ErpError::adapter(AdapterErrorKind::Authentication, message),
        408 => ErpError::adapter(AdapterErrorKind::NetworkTimeout, message),
        429 => ErpError::adapter(AdapterErrorKind::RateLimited, message),
        500..=599 => ErpError::adapter(AdapterErrorKind::ServerUnavailable, message),
        code @ 400..=499 => ErpError::Rejected { status: code, message },
        _ => ErpError::adapter(AdapterErrorKind::Unknown, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_and_throttling_are_transient() {
        for (status, kind) in [
            (StatusCode::UNAUTHORIZED, AdapterErrorKind::Authentication),
            (StatusCode::FORBIDDEN, AdapterErrorKind::Authentication),
            (StatusCode::REQUEST_TIMEOUT, AdapterErrorKind::NetworkTimeout),
            (StatusCode::TOO_MANY_REQUESTS, AdapterErrorKind::RateLimited),
            (StatusCode::BAD_GATEWAY, AdapterErrorKind::ServerUnavailable),
        ] {
            let err = classify_status(status, "");
            assert_eq!(err.adapter_kind(), Some(kind), "status {status}");
            assert!(err.is_retryable());
        }
    }

    #[test]
    fn other_client_errors_are_rejections() {
        match classify_status(StatusCode::UNPROCESSABLE_ENTITY, "duplicate reference") {
            ErpError::Rejected { status, message } => {
                assert_eq!(status, 422);
                assert!(message.contains("duplicate reference"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert!(!classify_status(StatusCode::BAD_REQUEST, "").is_retryable());
    }

    #[test]
    fn infra_error_round_trips_domain_error() {
        let infra = InfraError::from(ErpError::malformed("x"));
        assert_eq!(ErpError::from(infra), ErpError::malformed("x"));
    }
}
