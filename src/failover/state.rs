//! Shared failover state.
//!
//! # Invariants
//! - The active endpoint id and its connection URL live in one record
//!   (`ActiveTarget`) and are replaced with a single atomic swap
//! - Only the failover controller mutates this state; any number of readers

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use arc_swap::ArcSwap;
use serde::Serialize;
use url::Url;

use crate::cluster::{ClusterRegistry, Endpoint, EndpointId, RegistryError};

/// The endpoint consumers should currently use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTarget {
    endpoint: Endpoint,
}

impl ActiveTarget {
    pub fn id(&self) -> &EndpointId {
        self.endpoint.id()
    }

    pub fn connection_url(&self) -> &Url {
        self.endpoint.connection_url()
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

/// Point-in-time view for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailoverSnapshot {
    pub active_endpoint: EndpointId,
    pub connection_url: String,
    pub consecutive_failures: u32,
    pub failovers: u64,
    pub failover_attempts: u64,
}

/// Process-wide failover state, shared via `Arc`.
#[derive(Debug)]
pub struct FailoverState {
    active: ArcSwap<ActiveTarget>,
    consecutive_failures: AtomicU32,
    failovers: AtomicU64,
    failover_attempts: AtomicU64,
}

impl FailoverState {
    /// Start with `endpoint` as the active target.
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            active: ArcSwap::from_pointee(ActiveTarget { endpoint }),
            consecutive_failures: AtomicU32::new(0),
            failovers: AtomicU64::new(0),
            failover_attempts: AtomicU64::new(0),
        }
    }

    /// Start with the registry entry named `default_endpoint` as active.
    pub fn from_registry(registry: &ClusterRegistry, default_endpoint: &str) -> Result<Self, RegistryError> {
        let endpoint = registry.require(default_endpoint)?.clone();
        Ok(Self::new(endpoint))
    }

    /// Consistent view of the active endpoint and its connection URL.
    pub fn active(&self) -> Arc<ActiveTarget> {
        self.active.load_full()
    }

    pub fn active_id(&self) -> EndpointId {
        self.active.load().id().clone()
    }

    /// The connection URL consumers should use right now.
    ///
    /// May change between calls.
    pub fn current_target(&self) -> Url {
        self.active.load().connection_url().clone()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Acquire)
    }

    /// Number of committed switches since startup.
    pub fn failovers(&self) -> u64 {
        self.failovers.load(Ordering::Relaxed)
    }

    /// Number of times the threshold was crossed and a candidate checked,
    /// whether or not the switch happened.
    pub fn failover_attempts(&self) -> u64 {
        self.failover_attempts.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> FailoverSnapshot {
        let active = self.active();
        FailoverSnapshot {
            active_endpoint: active.id().clone(),
            connection_url: active.connection_url().to_string(),
            consecutive_failures: self.consecutive_failures(),
            failovers: self.failovers(),
            failover_attempts: self.failover_attempts(),
        }
    }

    pub(crate) fn record_failure(&self) -> u32 {
        self.consecutive_failures.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub(crate) fn reset_failures(&self) {
        self.consecutive_failures.store(0, Ordering::Release);
    }

    pub(crate) fn record_attempt(&self) {
        self.failover_attempts.fetch_add(1, Ordering::Relaxed);
    }

    /// Make `endpoint` the active target.
    pub(crate) fn promote(&self, endpoint: Endpoint) {
        self.active.store(Arc::new(ActiveTarget { endpoint }));
        self.failovers.fetch_add(1, Ordering::Relaxed);
    }
}
