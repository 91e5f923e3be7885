//! Cluster registry.
//!
//! # Responsibilities
//! - Hold the configured endpoints in failover order
//! - Resolve endpoints by identifier
//! - Pick the failover candidate for the active endpoint

use std::collections::HashSet;
use thiserror::Error;
use url::Url;

use crate::cluster::endpoint::{Endpoint, EndpointId};
use crate::config::EndpointConfig;

/// Errors building a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("at least two endpoints are required, got {0}")]
    TooFewEndpoints(usize),

    #[error("duplicate endpoint '{0}'")]
    DuplicateEndpoint(EndpointId),

    #[error("invalid {field} for endpoint '{endpoint}': {source}")]
    InvalidUrl {
        endpoint: String,
        field: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("unknown endpoint '{0}'")]
    UnknownEndpoint(String),
}

/// Ordered, read-only set of endpoints.
#[derive(Debug, Clone)]
pub struct ClusterRegistry {
    endpoints: Vec<Endpoint>,
}

impl ClusterRegistry {
    pub fn new(endpoints: Vec<Endpoint>) -> Result<Self, RegistryError> {
        if endpoints.len() < 2 {
            return Err(RegistryError::TooFewEndpoints(endpoints.len()));
        }

        let mut seen = HashSet::new();
        for endpoint in &endpoints {
            if !seen.insert(endpoint.id()) {
                return Err(RegistryError::DuplicateEndpoint(endpoint.id().clone()));
            }
        }

        Ok(Self { endpoints })
    }

    /// Build the registry from endpoint configuration, preserving order.
    pub fn from_config(configs: &[EndpointConfig]) -> Result<Self, RegistryError> {
        let parse = |name: &str, field: &'static str, raw: &str| {
            Url::parse(raw).map_err(|source| RegistryError::InvalidUrl {
                endpoint: name.to_string(),
                field,
                source,
            })
        };

        let endpoints = configs
            .iter()
            .map(|config| {
                let health_url = parse(&config.name, "health_url", &config.health_url)?;
                let connection_url = config
                    .connection_url
                    .as_deref()
                    .map(|raw| parse(&config.name, "connection_url", raw))
                    .transpose()?;
                Ok::<_, RegistryError>(Endpoint::new(config.name.as_str(), health_url, connection_url))
            })
            .collect::<Result<Vec<_>, RegistryError>>()?;

        Self::new(endpoints)
    }

    pub fn get(&self, id: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| e.id().as_str() == id)
    }

    /// Resolve an endpoint, failing on unknown identifiers.
    pub fn require(&self, id: &str) -> Result<&Endpoint, RegistryError> {
        self.get(id)
            .ok_or_else(|| RegistryError::UnknownEndpoint(id.to_string()))
    }

    /// The endpoint following `active` in registry order, wrapping around.
    ///
    /// With two endpoints this is simply "the other one".
    pub fn candidate_for(&self, active: &EndpointId) -> Option<&Endpoint> {
        let position = self.endpoints.iter().position(|e| e.id() == active)?;
        let next = (position + 1) % self.endpoints.len();
        (next != position).then(|| &self.endpoints[next])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
