//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::registry::{parse_services, ServiceParseError};

/// Prefix shared by every environment variable the relay reads.
pub const ENV_PREFIX: &str = "RELAY_";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid services: {0}")]
    Services(#[from] ServiceParseError),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from the process environment.
pub fn load_from_env() -> Result<RelayConfig, ConfigError> {
    load_with(|key| std::env::var(key).ok())
}

/// Load configuration using `lookup` to resolve `RELAY_*` variables.
///
/// `RELAY_CONFIG_FILE`, when set, provides the base configuration; every other
/// variable overrides a single field on top of it.
pub fn load_with<F>(lookup: F) -> Result<RelayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

    let mut config = match var("CONFIG_FILE") {
        Some(path) => read_config_file(Path::new(&path))?,
        None => RelayConfig::default(),
    };

    if let Some(services) = var("SERVICES") {
        config.services = parse_services(&services)?.into();
    }
    if let Some(addr) = var("BIND_ADDRESS") {
        config.listener.bind_address = addr;
    }
    if let Some(level) = var("LOG_LEVEL") {
        config.observability.log_level = level;
    }
    if let Some(secs) = var("REQUEST_TIMEOUT_SECS") {
        config.timeouts.request_secs = parse_number("REQUEST_TIMEOUT_SECS", &secs)?;
    }
    if let Some(bytes) = var("MAX_BODY_BYTES") {
        config.limits.max_body_bytes = parse_number("MAX_BODY_BYTES", &bytes)?;
    }
    if let Some(addr) = var("METRICS_ADDRESS") {
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = addr;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: format!("{}{}", ENV_PREFIX, name),
        value: raw.to_string(),
    })
}
