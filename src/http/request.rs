//! Request decoding and identification.
//!
//! # Responsibilities
//! - Decode `POST /relay` bodies into validated `RelayRequest`s
//! - Turn decoding failures into `422 {"detail": ...}` responses, or `413`
//!   when the body is over the size limit
//! - Name the request ID header shared by middleware and spans

use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    Json,
};

use crate::relay::{RelayError, RelayRequest};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// A `RelayRequest` extracted from a JSON body.
///
/// Document rules (path prefix, timeout range, single body) are enforced
/// while deserializing, so a handler never sees an invalid request.
#[derive(Debug, Clone)]
pub struct RelayPayload(pub RelayRequest);

impl<S> FromRequest<S> for RelayPayload
where
    S: Send + Sync,
{
    type Rejection = RelayError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(request) = Json::<RelayRequest>::from_request(req, state)
            .await
            .map_err(|rejection| match rejection.status() {
                StatusCode::PAYLOAD_TOO_LARGE => RelayError::BodyTooLarge(rejection.body_text()),
                _ => RelayError::InvalidRequest(rejection.body_text()),
            })?;
        Ok(Self(request))
    }
}
