//! Active health probing.
//!
//! # Responsibilities
//! - Issue one HEAD request against a health-check URL
//! - Bound it with a timeout
//! - Fold every outcome into a `HealthVerdict`

use std::future::Future;
use std::time::{Duration, Instant};
use reqwest::StatusCode;
use tokio::time;
use url::Url;

use crate::health::verdict::HealthVerdict;

/// Something that can answer "is this URL healthy right now?".
///
/// Implementations must not fail: transport errors become `Unhealthy`.
pub trait Prober: Send + Sync {
    fn probe(&self, url: &Url) -> impl Future<Output = HealthVerdict> + Send;
}

/// HTTP HEAD prober backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Self::with_user_agent(timeout, concat!("sync-failover/", env!("CARGO_PKG_VERSION")))
    }

    pub fn with_user_agent(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            // Probes measure direct reachability of the endpoint.
            .no_proxy()
            .build()?;

        Ok(Self { client, timeout })
    }
}

impl Prober for HttpProber {
    async fn probe(&self, url: &Url) -> HealthVerdict {
        let started = Instant::now();
        let response_future = self.client.head(url.clone()).send();

        match time::timeout(self.timeout, response_future).await {
            Ok(Ok(response)) => {
                let status = response.status();
                tracing::info!(
                    url = %url,
                    status = status.as_u16(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    headers = ?response.headers(),
                    "Health check response"
                );

                if status == StatusCode::OK {
                    tracing::info!(url = %url, "Endpoint is healthy");
                    HealthVerdict::Healthy
                } else {
                    tracing::warn!(url = %url, status = %status, "Health check failed: non-OK status");
                    HealthVerdict::Unhealthy
                }
            }
            Ok(Err(e)) => {
                tracing::error!(url = %url, error = %e, "Health check failed: transport error");
                HealthVerdict::Unhealthy
            }
            Err(_) => {
                tracing::error!(
                    url = %url,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Health check failed: timeout"
                );
                HealthVerdict::Unhealthy
            }
        }
    }
}
