//! Relay error kinds and their HTTP translation.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::registry::RegistryError;

/// Errors surfaced to relay callers.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The requested service identifier is not configured.
    #[error("Unknown service requested")]
    UnknownService(String),

    /// The upstream did not answer within the request's timeout.
    #[error("{0}")]
    Timeout(String),

    /// Any other transport or protocol failure talking to the upstream.
    #[error("{0}")]
    Upstream(String),

    /// The relay request document was rejected before relaying.
    #[error("{0}")]
    InvalidRequest(String),

    /// The inbound body exceeded the configured size limit.
    #[error("{0}")]
    BodyTooLarge(String),
}

impl RelayError {
    /// The status code this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::UnknownService(_) => StatusCode::NOT_FOUND,
            RelayError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            RelayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            RelayError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            RelayError::BodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    /// Classify a `reqwest` failure.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        let detail = error_chain(err);
        if err.is_timeout() {
            RelayError::Timeout(detail)
        } else {
            RelayError::Upstream(detail)
        }
    }
}

impl From<RegistryError> for RelayError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownService(service) => RelayError::UnknownService(service),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// Render an error with its sources, `outer: inner: root`.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut detail = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !detail.contains(&text) {
            detail.push_str(": ");
            detail.push_str(&text);
        }
        source = cause.source();
    }
    detail
}
