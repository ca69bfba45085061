//! Configuration module for the pfSense exporter.
//!
//! Provides YAML-based configuration loading and validation for:
//! - Listener settings (address, port)
//! - Scrape targets (connection, credentials, per-scrape limits)

mod app;
mod target;
mod validation;

pub use app::{ConfigFile, ExporterConfig, TargetResolver};
pub use target::{Auth, Scheme, Target, TargetConfig};
pub use validation::{ConfigError, expand_env_vars};

// Re-export constants
pub use app::{DEFAULT_ADDRESS, DEFAULT_PORT};
pub use target::{
    DEFAULT_MAX_COLLECTOR_BUFFER_SIZE, DEFAULT_MAX_COLLECTOR_CONCURRENCY, DEFAULT_TIMEOUT_SECS,
};
