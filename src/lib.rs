//! pfSense Exporter - Prometheus exporter for pfSense appliances
//!
//! This crate provides the scrape pipeline behind the `pfsense-exporter`
//! binary. It can also be embedded by other Rust projects that want to
//! collect pfSense metrics through the pfSense REST API.
//!
//! # Architecture
//!
//! - **Config**: YAML listener and target configuration with validation
//! - **Client**: Authenticated REST API client, one per scrape
//! - **Collectors**: One collector per API resource, run concurrently per scrape
//! - **Exposition**: Prometheus text format rendering
//! - **Server**: `/metrics?target=<host>` and `/healthz` endpoints
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pfsense_exporter::{
//!     CollectorRegistry, ExporterConfig, MasterCollector, TargetResolver,
//!     server::{AppState, create_router},
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExporterConfig::load("config.yml")?;
//!     let state = AppState {
//!         resolver: Arc::new(TargetResolver::new(config.targets.clone())),
//!         master: Arc::new(MasterCollector::new(Arc::new(
//!             CollectorRegistry::with_default_collectors(),
//!         ))),
//!     };
//!
//!     let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
//!     axum::serve(listener, create_router(state)).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod collector;
pub mod config;
pub mod exposition;
pub mod server;

pub use client::{ApiClient, ClientError, Envelope};
pub use collector::{
    Collector, CollectorError, CollectorRegistry, MasterCollector, MetricDesc, Sample, SampleSet,
};
pub use config::{ConfigError, ExporterConfig, Target, TargetConfig, TargetResolver};
pub use exposition::{ExpositionError, encode};
