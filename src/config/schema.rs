//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the failover
//! monitor. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the failover monitor.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FailoverConfig {
    /// Endpoint definitions, in failover order.
    pub endpoints: Vec<EndpointConfig>,

    /// Health monitoring settings.
    pub monitor: MonitorConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Read-only status API.
    pub admin: AdminConfig,
}

/// A single monitored endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointConfig {
    /// Unique endpoint identifier (e.g. "primary").
    pub name: String,

    /// URL probed with HEAD requests (e.g. ".../_ping").
    pub health_url: String,

    /// URL handed to consumers for data traffic.
    /// Falls back to `health_url` when omitted.
    #[serde(default)]
    pub connection_url: Option<String>,
}

impl EndpointConfig {
    pub fn new(name: &str, health_url: &str, connection_url: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            health_url: health_url.to_string(),
            connection_url: connection_url.map(str::to_string),
        }
    }
}

/// The observed deployment: two sync-gateway clusters.
fn default_endpoints() -> Vec<EndpointConfig> {
    vec![
        EndpointConfig::new(
            "primary",
            "https://primary.sync.example.com:4984/_ping",
            Some("wss://primary.sync.example.com:4984/db"),
        ),
        EndpointConfig::new(
            "secondary",
            "https://secondary.sync.example.com:4984/_ping",
            Some("wss://secondary.sync.example.com:4984/db"),
        ),
    ]
}

/// Health monitoring configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between health checks of the active endpoint.
    pub interval_secs: u64,

    /// Per-probe timeout in seconds.
    pub timeout_secs: u64,

    /// Failover is attempted once consecutive failures exceed this value.
    pub failure_threshold: u32,

    /// Endpoint that is active at startup.
    pub default_endpoint: String,

    /// User-Agent sent with health probes.
    pub user_agent: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3,
            timeout_secs: 5,
            failure_threshold: 9,
            default_endpoint: "primary".to_string(),
            user_agent: concat!("sync-failover/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Status API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the status API.
    pub enabled: bool,

    /// Status API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

impl Default for FailoverConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            monitor: MonitorConfig::default(),
            observability: ObservabilityConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}
