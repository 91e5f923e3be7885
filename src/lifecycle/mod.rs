//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Registry → State → Prober → spawn monitor (+ status API, metrics)
//!
//! Shutdown (shutdown.rs):
//!     Signal received → trigger → every listener (monitor loop, status API) exits
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Shutdown does not wait for in-flight probes
//! - Nothing is persisted on exit

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownListener};
pub use signals::{wait_for_signal, ShutdownSignal};
pub use startup::{start, Monitor, StartupError};
