use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::http::request::RelayPayload;
use crate::http::response::{HealthStatus, ServicesListing};
use crate::http::server::AppState;
use crate::relay::{RelayError, RelayRequest, RelayResponse};

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus::ok())
}

pub async fn list_services(State(state): State<AppState>) -> Json<ServicesListing> {
    Json(ServicesListing {
        services: state.relayer.registry().all().clone(),
    })
}

/// `POST /relay`.
pub async fn relay(
    State(state): State<AppState>,
    RelayPayload(request): RelayPayload,
) -> Result<Json<RelayResponse>, RelayError> {
    state.relayer.relay(request).await.map(Json)
}

/// `GET /relay/{service}/{*path}`.
pub async fn relay_get(
    State(state): State<AppState>,
    Path((service, path)): Path<(String, String)>,
) -> Result<Json<RelayResponse>, RelayError> {
    let request = RelayRequest::get(service, format!("/{}", path));
    state.relayer.relay(request).await.map(Json)
}

/// `GET /relay/{service}/`.
pub async fn relay_get_root(
    State(state): State<AppState>,
    Path(service): Path<String>,
) -> Result<Json<RelayResponse>, RelayError> {
    state.relayer.relay(RelayRequest::get(service, "/")).await.map(Json)
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not Found" })))
}
