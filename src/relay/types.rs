//! Relay request and response documents.
//!
//! Both documents keep the flat JSON shape callers send and receive
//! (`json_body`/`raw_body`, `body`/`text`) while exposing tagged variants in
//! Rust. Conversion happens at the serde boundary via the `*Document` types.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Timeout applied when a relay request does not specify one, in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 10.0;

/// Largest timeout a relay request may ask for, in seconds.
pub const MAX_TIMEOUT_SECS: f64 = 60.0;

/// HTTP methods accepted for relaying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Options => reqwest::Method::OPTIONS,
        }
    }
}

/// Body to send upstream.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RelayBody {
    #[default]
    None,
    /// JSON-encoded before sending.
    Json(Value),
    /// Sent as-is.
    Raw(String),
}

/// A validated instruction to relay one request upstream.
///
/// Deserializing enforces every document rule: `path` starts with `/`, the
/// timeout lies in `(0, 60]` and at most one body is supplied.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "RelayRequestDocument", into = "RelayRequestDocument")]
pub struct RelayRequest {
    pub service: String,
    pub path: String,
    pub method: HttpMethod,
    pub query_params: Option<BTreeMap<String, String>>,
    pub headers: Option<BTreeMap<String, String>>,
    pub body: RelayBody,
    timeout: f64,
}

impl RelayRequest {
    /// A bodiless GET for `path` on `service` with the default timeout.
    pub fn get(service: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            path: path.into(),
            method: HttpMethod::Get,
            query_params: None,
            headers: None,
            body: RelayBody::None,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Replace the method.
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Replace the body.
    pub fn with_body(mut self, body: RelayBody) -> Self {
        self.body = body;
        self
    }

    /// Add a single header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Add a single query parameter.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Set the timeout in seconds, rejecting values outside `(0, 60]`.
    pub fn with_timeout(mut self, secs: f64) -> Result<Self, RequestValidationError> {
        self.timeout = check_timeout(secs)?;
        Ok(self)
    }

    /// Timeout in seconds.
    pub fn timeout_secs(&self) -> f64 {
        self.timeout
    }

    /// Timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout)
    }
}

/// Reasons a relay request document is rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RequestValidationError {
    #[error("path must start with '/', got '{0}'")]
    PathWithoutSlash(String),

    #[error("timeout must be greater than 0 and at most {max} seconds, got {0}", max = MAX_TIMEOUT_SECS)]
    TimeoutOutOfRange(f64),

    #[error("Only one of json_body or raw_body can be supplied")]
    ConflictingBodies,
}

fn check_timeout(secs: f64) -> Result<f64, RequestValidationError> {
    if secs > 0.0 && secs <= MAX_TIMEOUT_SECS {
        Ok(secs)
    } else {
        Err(RequestValidationError::TimeoutOutOfRange(secs))
    }
}

/// Wire form of [`RelayRequest`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayRequestDocument {
    pub service: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_params: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_body: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout: f64,
}

fn default_path() -> String {
    "/".to_string()
}

fn default_timeout() -> f64 {
    DEFAULT_TIMEOUT_SECS
}

impl TryFrom<RelayRequestDocument> for RelayRequest {
    type Error = RequestValidationError;

    fn try_from(doc: RelayRequestDocument) -> Result<Self, Self::Error> {
        let path = doc.path.trim().to_string();
        if !path.starts_with('/') {
            return Err(RequestValidationError::PathWithoutSlash(path));
        }
        let timeout = check_timeout(doc.timeout)?;
        let body = match (doc.json_body, doc.raw_body) {
            (Some(_), Some(_)) => return Err(RequestValidationError::ConflictingBodies),
            (Some(json), None) => RelayBody::Json(json),
            (None, Some(raw)) => RelayBody::Raw(raw),
            (None, None) => RelayBody::None,
        };

        Ok(Self {
            service: doc.service.trim().to_string(),
            path,
            method: doc.method,
            query_params: doc.query_params,
            headers: doc.headers,
            body,
            timeout,
        })
    }
}

impl From<RelayRequest> for RelayRequestDocument {
    fn from(request: RelayRequest) -> Self {
        let (json_body, raw_body) = match request.body {
            RelayBody::None => (None, None),
            RelayBody::Json(json) => (Some(json), None),
            RelayBody::Raw(raw) => (None, Some(raw)),
        };
        Self {
            service: request.service,
            path: request.path,
            method: request.method,
            query_params: request.query_params,
            headers: request.headers,
            json_body,
            raw_body,
            timeout: request.timeout,
        }
    }
}

/// Upstream response body, decoded as JSON when possible.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    /// JSON first, falling back to the text itself.
    ///
    /// `text` is the body already decoded with the response's declared
    /// charset.
    pub fn decode(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(json) => ResponseBody::Json(json),
            Err(_) => ResponseBody::Text(text),
        }
    }

    pub fn json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(json) => Some(json),
            ResponseBody::Text(_) => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            ResponseBody::Json(_) => None,
            ResponseBody::Text(text) => Some(text),
        }
    }
}

/// The normalized result of a relay call.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(from = "RelayResponseDocument", into = "RelayResponseDocument")]
pub struct RelayResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: ResponseBody,
    pub elapsed_ms: f64,
    pub url: String,
}

/// Wire form of [`RelayResponse`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayResponseDocument {
    pub status_code: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub text: Option<String>,
    pub elapsed_ms: f64,
    pub url: String,
}

impl From<RelayResponse> for RelayResponseDocument {
    fn from(response: RelayResponse) -> Self {
        let (body, text) = match response.body {
            ResponseBody::Json(Value::Null) => (None, None),
            ResponseBody::Json(json) => (Some(json), None),
            ResponseBody::Text(text) => (None, Some(text)),
        };
        Self {
            status_code: response.status_code,
            headers: response.headers,
            body,
            text,
            elapsed_ms: response.elapsed_ms,
            url: response.url,
        }
    }
}

impl From<RelayResponseDocument> for RelayResponse {
    fn from(doc: RelayResponseDocument) -> Self {
        let body = match (doc.body, doc.text) {
            (_, Some(text)) => ResponseBody::Text(text),
            (json, None) => ResponseBody::Json(json.unwrap_or(Value::Null)),
        };
        Self {
            status_code: doc.status_code,
            headers: doc.headers,
            body,
            elapsed_ms: doc.elapsed_ms,
            url: doc.url,
        }
    }
}
