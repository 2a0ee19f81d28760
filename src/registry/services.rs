//! The immutable service registry.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::registry::parser::{parse_services, ServiceParseError};

/// Errors raised by registry lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Unknown service requested: {0}")]
    UnknownService(String),
}

/// Read-only mapping from service identifier to upstream base URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceRegistry {
    services: BTreeMap<String, String>,
}

impl ServiceRegistry {
    /// Create a registry from an already parsed mapping.
    pub fn new(services: BTreeMap<String, String>) -> Self {
        Self { services }
    }

    /// Create a registry from a raw configuration value.
    pub fn from_config_value(value: &str) -> Result<Self, ServiceParseError> {
        parse_services(value).map(Self::new)
    }

    /// The full mapping.
    pub fn all(&self) -> &BTreeMap<String, String> {
        &self.services
    }

    /// Resolve a service identifier to its base URL.
    pub fn lookup(&self, service: &str) -> Result<&str, RegistryError> {
        self.services
            .get(service)
            .map(String::as_str)
            .ok_or_else(|| RegistryError::UnknownService(service.to_string()))
    }

    pub fn contains(&self, service: &str) -> bool {
        self.services.contains_key(service)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
