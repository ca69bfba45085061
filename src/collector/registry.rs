//! Collector registry.
//!
//! The registry is assembled once at start-up and then shared read-only with
//! every scrape.

use std::sync::Arc;

use crate::collector::{
    CarpCollector, Collector, FirewallScheduleCollector, FirewallStatesCollector,
    GatewayCollector, InterfaceCollector, LoginProtectionCollector, MetricDesc, PackageCollector,
    RestApiCollector, ServiceCollector, SystemCollector,
};

/// Every resource collector the exporter ships with, in registration order.
fn default_collectors() -> Vec<Arc<dyn Collector>> {
    vec![
        Arc::new(CarpCollector::new()),
        Arc::new(FirewallScheduleCollector::new()),
        Arc::new(FirewallStatesCollector::new()),
        Arc::new(GatewayCollector::new()),
        Arc::new(InterfaceCollector::new()),
        Arc::new(LoginProtectionCollector::new()),
        Arc::new(PackageCollector::new()),
        Arc::new(RestApiCollector::new()),
        Arc::new(ServiceCollector::new()),
        Arc::new(SystemCollector::new()),
    ]
}

/// Ordered list of collectors.
///
/// Names are not de-duplicated; two collectors sharing a name are both
/// registered and both match the same allow-list entry.
#[derive(Default, Clone)]
pub struct CollectorRegistry {
    collectors: Vec<Arc<dyn Collector>>,
}

impl CollectorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in collector.
    pub fn with_default_collectors() -> Self {
        let mut registry = Self::new();
        for collector in default_collectors() {
            registry.register_arc(collector);
        }
        registry
    }

    /// Append a collector.
    pub fn register<C: Collector>(&mut self, collector: C) -> &mut Self {
        self.register_arc(Arc::new(collector))
    }

    /// Append an already shared collector.
    pub fn register_arc(&mut self, collector: Arc<dyn Collector>) -> &mut Self {
        tracing::debug!(collector = collector.name(), "Collector registered");
        self.collectors.push(collector);
        self
    }

    /// All collectors in registration order.
    pub fn all(&self) -> &[Arc<dyn Collector>] {
        &self.collectors
    }

    /// Collector names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.collectors.iter().map(|c| c.name()).collect()
    }

    /// Metric descriptions of every collector, in registration order.
    pub fn descriptions(&self) -> Vec<MetricDesc> {
        self.collectors
            .iter()
            .flat_map(|c| c.describe().iter().copied())
            .collect()
    }

    /// Number of registered collectors.
    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }
}

impl std::fmt::Debug for CollectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorRegistry")
            .field("collectors", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiClient;
    use crate::collector::{CollectorError, Sample};

    const NOOP: MetricDesc = MetricDesc::new("noop", "No-op gauge.", &["host"]);

    /// A collector that produces nothing.
    struct NoopCollector(&'static str);

    #[async_trait::async_trait]
    impl Collector for NoopCollector {
        fn name(&self) -> &str {
            self.0
        }

        fn describe(&self) -> &[MetricDesc] {
            &[NOOP]
        }

        async fn collect(&self, _client: &ApiClient) -> Result<Vec<Sample>, CollectorError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_registry_preserves_order() {
        let mut registry = CollectorRegistry::new();
        registry
            .register(NoopCollector("b"))
            .register(NoopCollector("a"))
            .register(NoopCollector("c"));

        assert_eq!(registry.names(), vec!["b", "a", "c"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_registry_keeps_duplicate_names() {
        let mut registry = CollectorRegistry::new();
        registry
            .register(NoopCollector("dup"))
            .register(NoopCollector("dup"));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.descriptions().len(), 2);
    }

    #[test]
    fn test_default_registry_contents() {
        let registry = CollectorRegistry::with_default_collectors();
        assert_eq!(
            registry.names(),
            vec![
                "carp",
                "firewall_schedule",
                "firewall_states",
                "gateways",
                "interface",
                "login_protection",
                "package",
                "restapi",
                "service",
                "system",
            ]
        );
    }

    #[test]
    fn test_default_registry_metric_names_unique() {
        let registry = CollectorRegistry::with_default_collectors();
        let descs = registry.descriptions();
        let mut names: Vec<_> = descs.iter().map(|d| d.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), descs.len());
        assert!(descs.iter().all(|d| d.labels.first() == Some(&"host")));
    }
}
