//! Parsing of service mappings supplied as a single configuration value.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

/// Errors produced while parsing a service mapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceParseError {
    /// A `name=url` token was missing its name or its URL.
    #[error("services must be provided as JSON or 'name=url' pairs, got '{0}'")]
    MalformedPair(String),

    /// A JSON object entry whose value is not a string.
    #[error("URL for service '{0}' must be a string")]
    NonStringUrl(String),
}

/// Parse a service mapping from either a JSON object or `name=url,name2=url2`.
///
/// JSON that is not an object falls through to pair parsing. Empty tokens
/// are skipped, so an empty value yields an empty mapping.
pub fn parse_services(value: &str) -> Result<BTreeMap<String, String>, ServiceParseError> {
    if let Ok(Value::Object(entries)) = serde_json::from_str::<Value>(value) {
        return entries
            .into_iter()
            .map(|(name, url)| match url {
                Value::String(url) => Ok((name, url)),
                _ => Err(ServiceParseError::NonStringUrl(name)),
            })
            .collect();
    }

    let mut services = BTreeMap::new();
    for token in value.split(',') {
        if token.trim().is_empty() {
            continue;
        }
        let (name, url) = token
            .split_once('=')
            .map(|(name, url)| (name.trim(), url.trim()))
            .ok_or_else(|| ServiceParseError::MalformedPair(token.to_string()))?;
        if name.is_empty() || url.is_empty() {
            return Err(ServiceParseError::MalformedPair(token.to_string()));
        }
        services.insert(name.to_string(), url.to_string());
    }
    Ok(services)
}
