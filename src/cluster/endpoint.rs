//! Endpoint abstraction.
//!
//! # Responsibilities
//! - Name a single monitored cluster
//! - Hold its health-check URL (probing only)
//! - Hold its connection URL (handed to consumers)

use std::fmt;
use std::sync::Arc;
use serde::{Serialize, Serializer};
use url::Url;

/// Identifier of a configured endpoint (e.g. `primary`, `secondary`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndpointId(Arc<str>);

impl EndpointId {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for EndpointId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl From<&str> for EndpointId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A single monitored endpoint. Immutable once configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    id: EndpointId,
    health_url: Url,
    connection_url: Url,
}

impl Endpoint {
    /// Create an endpoint. Without a separate connection URL, consumers are
    /// pointed at the health-check URL.
    pub fn new(id: impl Into<EndpointId>, health_url: Url, connection_url: Option<Url>) -> Self {
        let connection_url = connection_url.unwrap_or_else(|| health_url.clone());
        Self {
            id: id.into(),
            health_url,
            connection_url,
        }
    }

    pub fn id(&self) -> &EndpointId {
        &self.id
    }

    pub fn health_url(&self) -> &Url {
        &self.health_url
    }

    pub fn connection_url(&self) -> &Url {
        &self.connection_url
    }
}
