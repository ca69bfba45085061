//! Collector Layer
//!
//! Resource collectors that turn pfSense REST API payloads into gauge
//! samples, plus the machinery that runs them for a scrape.
//!
//! # Architecture
//!
//! - [`Collector`]: Core trait for one API resource
//! - [`CollectorRegistry`]: Ordered set of collectors, built once at start-up
//! - [`MasterCollector`]: Runs the registry against one target with bounded
//!   concurrency and merges the results
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pfsense_exporter::{ApiClient, CollectorRegistry, MasterCollector, TargetConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let target = TargetConfig {
//!     host: "fw1.example.net".to_string(),
//!     port: 443,
//!     auth_method: Some("key".to_string()),
//!     key: Some("${PFSENSE_API_KEY}".to_string()),
//!     ..Default::default()
//! }
//! .validate()?;
//!
//! let master = MasterCollector::new(Arc::new(CollectorRegistry::with_default_collectors()));
//! let samples = master.collect(&ApiClient::new(Arc::new(target))?).await;
//! println!("{} samples", samples.len());
//! # Ok(())
//! # }
//! ```

mod carp;
pub mod convert;
mod firewall_schedule;
mod firewall_states;
mod gateway;
mod interface;
mod login_protection;
mod master;
mod package;
mod registry;
mod restapi;
mod service;
mod system;
mod traits;

pub use carp::CarpCollector;
pub use firewall_schedule::FirewallScheduleCollector;
pub use firewall_states::FirewallStatesCollector;
pub use gateway::GatewayCollector;
pub use interface::InterfaceCollector;
pub use login_protection::LoginProtectionCollector;
pub use master::MasterCollector;
pub use package::PackageCollector;
pub use registry::CollectorRegistry;
pub use restapi::RestApiCollector;
pub use service::ServiceCollector;
pub use system::SystemCollector;
pub use traits::{
    Collector, CollectorError, METRICS_NAMESPACE, MetricDesc, Sample, SampleSet, decode_data,
    fetch_data, null_default,
};
