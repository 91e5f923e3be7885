//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (default endpoint exists)
//! - Validate URLs, durations and bind addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FailoverConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::FailoverConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("at least two endpoints are required, found {0}")]
    TooFewEndpoints(usize),

    #[error("endpoint name must not be empty")]
    EmptyEndpointName,

    #[error("duplicate endpoint name '{0}'")]
    DuplicateEndpoint(String),

    #[error("endpoint '{endpoint}' has invalid {field}: {reason}")]
    InvalidUrl {
        endpoint: String,
        field: &'static str,
        reason: String,
    },

    #[error("monitor.{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("default endpoint '{0}' is not configured")]
    UnknownDefaultEndpoint(String),

    #[error("invalid {field} '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("unknown log level '{0}'")]
    InvalidLogLevel(String),
}

/// Validate a deserialized configuration.
pub fn validate_config(config: &FailoverConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.endpoints.len() < 2 {
        errors.push(ValidationError::TooFewEndpoints(config.endpoints.len()));
    }

    let mut seen = HashSet::new();
    for endpoint in &config.endpoints {
        if endpoint.name.trim().is_empty() {
            errors.push(ValidationError::EmptyEndpointName);
        } else if !seen.insert(endpoint.name.as_str()) {
            errors.push(ValidationError::DuplicateEndpoint(endpoint.name.clone()));
        }

        match Url::parse(&endpoint.health_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ValidationError::InvalidUrl {
                endpoint: endpoint.name.clone(),
                field: "health_url",
                reason: format!("unsupported scheme '{}'", url.scheme()),
            }),
            Err(e) => errors.push(ValidationError::InvalidUrl {
                endpoint: endpoint.name.clone(),
                field: "health_url",
                reason: e.to_string(),
            }),
        }

        if let Some(connection_url) = &endpoint.connection_url {
            if let Err(e) = Url::parse(connection_url) {
                errors.push(ValidationError::InvalidUrl {
                    endpoint: endpoint.name.clone(),
                    field: "connection_url",
                    reason: e.to_string(),
                });
            }
        }
    }

    if !config
        .endpoints
        .iter()
        .any(|e| e.name == config.monitor.default_endpoint)
    {
        errors.push(ValidationError::UnknownDefaultEndpoint(
            config.monitor.default_endpoint.clone(),
        ));
    }

    if config.monitor.interval_secs == 0 {
        errors.push(ValidationError::ZeroDuration("interval_secs"));
    }
    if config.monitor.timeout_secs == 0 {
        errors.push(ValidationError::ZeroDuration("timeout_secs"));
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if config.observability.metrics_enabled {
        check_address(&mut errors, "metrics_address", &config.observability.metrics_address);
    }
    if config.admin.enabled {
        check_address(&mut errors, "admin.bind_address", &config.admin.bind_address);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
