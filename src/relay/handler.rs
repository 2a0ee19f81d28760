//! Forwarding of relay requests to upstream services.
//!
//! # Responsibilities
//! - Resolve the service identifier through the registry
//! - Build the outbound call (URL, query, headers, body, timeout)
//! - Map timeouts to 504 and other transport errors to 502
//! - Normalize the upstream response into a `RelayResponse`

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use reqwest::header::HeaderMap;
use reqwest::{redirect, Client, ClientBuilder, Url};

use crate::observability::metrics;
use crate::registry::ServiceRegistry;
use crate::relay::error::{error_chain, RelayError};
use crate::relay::types::{RelayBody, RelayRequest, RelayResponse, ResponseBody};

/// User agent sent upstream unless the caller supplies one.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Relays requests to the services of a fixed registry.
#[derive(Clone)]
pub struct Relayer {
    registry: Arc<ServiceRegistry>,
    client: Client,
}

impl Relayer {
    /// Create a relayer with a default upstream client.
    pub fn new(registry: Arc<ServiceRegistry>) -> Result<Self, reqwest::Error> {
        let client = client_builder().build()?;
        Ok(Self::with_client(registry, client))
    }

    /// Create a relayer around an existing client.
    pub fn with_client(registry: Arc<ServiceRegistry>, client: Client) -> Self {
        Self { registry, client }
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Forward `request` upstream and normalize the answer.
    pub async fn relay(&self, request: RelayRequest) -> Result<RelayResponse, RelayError> {
        // Lookup failures return before any network activity.
        let result = match self.registry.lookup(&request.service) {
            Ok(base_url) => self.forward(base_url, &request).await,
            Err(err) => Err(err.into()),
        };

        let status = match &result {
            Ok(response) => response.status_code,
            Err(err) => err.status_code().as_u16(),
        };
        metrics::record_relay(&request.service, request.method.as_str(), status);

        result
    }

    async fn forward(
        &self,
        base_url: &str,
        request: &RelayRequest,
    ) -> Result<RelayResponse, RelayError> {
        let url = build_url(base_url, &request.path)?;

        tracing::debug!(
            service = %request.service,
            method = %request.method,
            url = %url,
            "Relaying request"
        );

        let mut outbound = self
            .client
            .request(request.method.into(), url)
            .timeout(request.timeout());

        if let Some(query) = &request.query_params {
            outbound = outbound.query(query);
        }
        if let Some(headers) = &request.headers {
            for (name, value) in headers {
                outbound = outbound.header(name.as_str(), value.as_str());
            }
        }
        outbound = match &request.body {
            RelayBody::None => outbound,
            RelayBody::Json(json) => outbound.json(json),
            RelayBody::Raw(raw) => outbound.body(raw.clone()),
        };

        let start = Instant::now();
        let response = outbound
            .send()
            .await
            .map_err(|e| self.transport_failure(base_url, request, &e))?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = flatten_headers(response.headers());
        let text = response
            .text()
            .await
            .map_err(|e| self.transport_failure(base_url, request, &e))?;
        let elapsed = start.elapsed();
        metrics::record_upstream_duration(&request.service, elapsed);
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;

        tracing::info!(
            service = %request.service,
            method = %request.method,
            status = status_code,
            elapsed_ms,
            "Upstream responded"
        );

        Ok(RelayResponse {
            status_code,
            headers,
            body: ResponseBody::decode(text),
            elapsed_ms,
            url: final_url,
        })
    }

    fn transport_failure(
        &self,
        base_url: &str,
        request: &RelayRequest,
        err: &reqwest::Error,
    ) -> RelayError {
        let relay_err = RelayError::from_transport(err);
        match &relay_err {
            RelayError::Timeout(_) => {
                tracing::warn!(
                    service = %request.service,
                    "Timeout when calling {}{}",
                    base_url,
                    request.path
                );
            }
            _ => {
                tracing::error!(
                    service = %request.service,
                    error = %relay_err,
                    "Error when calling upstream service"
                );
            }
        }
        relay_err
    }
}

/// Builder for the upstream client: relay user agent, redirects not followed.
pub fn client_builder() -> ClientBuilder {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(redirect::Policy::none())
}

/// Join a base URL and a request path.
///
/// The base URL's own path is kept, so `http://host/api` + `/users` becomes
/// `http://host/api/users`. A path without a leading `/` is rejected, since
/// it could otherwise extend the host (`.evil.example`, `@evil.example`).
pub fn build_url(base_url: &str, path: &str) -> Result<Url, RelayError> {
    if !path.starts_with('/') {
        return Err(RelayError::Upstream(format!(
            "Relay path must start with '/', got '{}'",
            path
        )));
    }
    let joined = format!("{}{}", base_url.trim_end_matches('/'), path);
    Url::parse(&joined).map_err(|e| {
        RelayError::Upstream(format!("Invalid upstream URL '{}': {}", joined, error_chain(&e)))
    })
}

/// Collect headers into a map, joining repeated names with `", "`.
fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut flat: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        match flat.entry(name.as_str().to_string()) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                existing.push_str(", ");
                existing.push_str(&value);
            }
            Entry::Vacant(entry) => {
                entry.insert(value.into_owned());
            }
        }
    }
    flat
}
