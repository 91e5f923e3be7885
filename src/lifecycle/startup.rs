//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration, then build the registry and shared state
//! - Initialize subsystems in dependency order
//! - Start background tasks (failover monitor, status API, metrics)
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The status API binds before the monitor starts, so a bad address
//!   aborts startup instead of running half-configured

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use metrics_exporter_prometheus::BuildError;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

use crate::admin::{self, AdminState};
use crate::cluster::{ClusterRegistry, RegistryError};
use crate::config::{validate_config, FailoverConfig, ValidationError};
use crate::config::loader::join_errors;
use crate::failover::{FailoverController, FailoverState, MonitorSettings};
use crate::health::HttpProber;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid {field} '{value}'")]
    Address { field: &'static str, value: String },

    #[error("failed to bind status API on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to install metrics exporter: {0}")]
    Metrics(#[from] BuildError),
}

/// A running failover monitor and its background tasks.
pub struct Monitor {
    registry: Arc<ClusterRegistry>,
    state: Arc<FailoverState>,
    shutdown: Shutdown,
    tasks: Vec<JoinHandle<()>>,
    admin_addr: Option<SocketAddr>,
}

/// Build every subsystem from `config` and spawn the background tasks.
pub async fn start(config: FailoverConfig) -> Result<Monitor, StartupError> {
    validate_config(&config).map_err(StartupError::Validation)?;

    let registry = Arc::new(ClusterRegistry::from_config(&config.endpoints)?);
    let state = Arc::new(FailoverState::from_registry(
        &registry,
        &config.monitor.default_endpoint,
    )?);
    let prober = HttpProber::with_user_agent(
        Duration::from_secs(config.monitor.timeout_secs),
        &config.monitor.user_agent,
    )?;

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::Address {
                field: "metrics_address",
                value: config.observability.metrics_address.clone(),
            })?;
        metrics::init_metrics(addr)?;
    }

    let shutdown = Shutdown::new();
    let mut tasks = Vec::new();

    let admin_addr = if config.admin.enabled {
        let bind_err = |source| StartupError::Bind {
            addr: config.admin.bind_address.clone(),
            source,
        };
        let listener = TcpListener::bind(&config.admin.bind_address)
            .await
            .map_err(bind_err)?;
        let addr = listener.local_addr().map_err(bind_err)?;

        let admin_state = AdminState {
            registry: registry.clone(),
            failover: state.clone(),
        };
        let admin_shutdown = shutdown.listen();
        tasks.push(tokio::spawn(async move {
            if let Err(e) = admin::serve(listener, admin_state, admin_shutdown).await {
                tracing::error!(error = %e, "Status API failed");
            }
        }));
        Some(addr)
    } else {
        None
    };

    let controller = FailoverController::new(
        registry.clone(),
        state.clone(),
        prober,
        MonitorSettings::from(&config.monitor),
    );
    tasks.push(tokio::spawn(controller.run(shutdown.listen())));

    tracing::info!(
        endpoints = registry.len(),
        active = %state.active_id(),
        connection_url = %state.current_target(),
        "Failover monitor started"
    );

    Ok(Monitor {
        registry,
        state,
        shutdown,
        tasks,
        admin_addr,
    })
}

impl Monitor {
    /// Shared state handle for in-process consumers.
    pub fn state(&self) -> &Arc<FailoverState> {
        &self.state
    }

    pub fn registry(&self) -> &Arc<ClusterRegistry> {
        &self.registry
    }

    /// The connection URL consumers should use right now.
    pub fn current_target(&self) -> Url {
        self.state.current_target()
    }

    /// Address the status API actually bound to, if enabled.
    pub fn admin_addr(&self) -> Option<SocketAddr> {
        self.admin_addr
    }

    /// Signal every background task to stop and wait for them to exit.
    pub async fn shutdown(self) {
        self.shutdown.trigger();
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Background task ended abnormally");
            }
        }
    }
}
