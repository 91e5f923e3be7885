//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Prober and controller produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Operators reading the log stream
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Failover decisions are visible through logs alone
//! - Critical events are `error!` records tagged `severity = "critical"`
//! - Metrics are cheap (no-ops without a recorder)

pub mod logging;
pub mod metrics;
