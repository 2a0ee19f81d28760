//! Typed client for the relay HTTP API.

use reqwest::{Client, Response};
use thiserror::Error;

use crate::http::response::{ErrorDetail, HealthStatus, ServicesListing};
use crate::relay::{RelayRequest, RelayResponse};

/// Errors returned by [`RelayClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The relay could not be reached or returned an unreadable body.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The relay answered with an error status.
    #[error("Relay returned status {status}: {detail}")]
    Status { status: u16, detail: String },
}

pub struct RelayClient {
    client: Client,
    relay_url: String,
}

impl RelayClient {
    pub fn new(relay_url: &str) -> Self {
        Self::with_client(Client::new(), relay_url)
    }

    pub fn with_client(client: Client, relay_url: &str) -> Self {
        Self {
            client,
            relay_url: relay_url.trim_end_matches('/').to_string(),
        }
    }

    /// `GET /health`.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let resp = self
            .client
            .get(format!("{}/health", self.relay_url))
            .send()
            .await?;
        decode(resp).await
    }

    /// `GET /services`.
    pub async fn services(&self) -> Result<ServicesListing, ClientError> {
        let resp = self
            .client
            .get(format!("{}/services", self.relay_url))
            .send()
            .await?;
        decode(resp).await
    }

    /// `POST /relay`.
    pub async fn relay(&self, request: &RelayRequest) -> Result<RelayResponse, ClientError> {
        let resp = self
            .client
            .post(format!("{}/relay", self.relay_url))
            .json(request)
            .send()
            .await?;
        decode(resp).await
    }

    /// `GET /relay/{service}/{path}`.
    pub async fn relay_get(&self, service: &str, path: &str) -> Result<RelayResponse, ClientError> {
        let resp = self
            .client
            .get(format!(
                "{}/relay/{}/{}",
                self.relay_url,
                service,
                path.trim_start_matches('/')
            ))
            .send()
            .await?;
        decode(resp).await
    }
}

async fn decode<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }

    let text = resp.text().await?;
    let detail = serde_json::from_str::<ErrorDetail>(&text)
        .map(|e| e.detail)
        .unwrap_or(text);
    Err(ClientError::Status {
        status: status.as_u16(),
        detail,
    })
}
