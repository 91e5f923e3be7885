//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → FailoverConfig (validated, immutable)
//!     → handed to startup, which builds the registry and monitor
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no dynamic reconfiguration
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{AdminConfig, EndpointConfig, FailoverConfig, LogFormat, MonitorConfig, ObservabilityConfig};
pub use validation::{validate_config, ValidationError};
