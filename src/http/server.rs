//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limits)
//! - Bind server to listener and serve until shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{HeaderName, Request},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::handlers;
use crate::http::request::X_REQUEST_ID;
use crate::registry::ServiceRegistry;
use crate::relay::Relayer;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub relayer: Relayer,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let registry = Arc::new(ServiceRegistry::new(config.services.0.clone()));

        tracing::info!(
            services = registry.len(),
            "Service registry loaded"
        );

        let relayer = Relayer::new(registry)?;
        Ok(Self::with_relayer(config, relayer))
    }

    /// Create a server around an existing relayer.
    pub fn with_relayer(config: RelayConfig, relayer: Relayer) -> Self {
        let router = Self::build_router(&config, AppState { relayer });
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let x_request_id = HeaderName::from_static(X_REQUEST_ID);

        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }))
            .layer(PropagateRequestIdLayer::new(x_request_id))
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        Router::new()
            .route("/health", get(handlers::health))
            .route("/services", get(handlers::list_services))
            .route("/relay", post(handlers::relay))
            .route("/relay/{service}/", get(handlers::relay_get_root))
            .route("/relay/{service}/{*path}", get(handlers::relay_get))
            .fallback(handlers::not_found)
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
            .layer(middleware)
    }

    /// The router, for serving or in-process calls.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            services = self.config.services.0.len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
