//! System service collector.

use serde::Deserialize;

use crate::client::ApiClient;
use crate::collector::convert::bool_to_f64;
use crate::collector::{
    Collector, CollectorError, MetricDesc, Sample, SampleSet, fetch_data, null_default,
};

const PATH: &str = "/api/v2/status/services";

const UP: MetricDesc = MetricDesc::new(
    "service_up",
    "Whether the service is up (1) or down (0).",
    &["host", "name"],
);
const ENABLED: MetricDesc = MetricDesc::new(
    "service_enabled",
    "Whether the service is enabled (1) or disabled (0).",
    &["host", "name"],
);

const METRICS: &[MetricDesc] = &[UP, ENABLED];

/// `status` is true while the service is running.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceStatus {
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    #[serde(deserialize_with = "null_default")]
    pub enabled: bool,
    #[serde(deserialize_with = "null_default")]
    pub status: bool,
}

/// Running and enabled state per service.
#[derive(Debug, Default)]
pub struct ServiceCollector;

impl ServiceCollector {
    pub fn new() -> Self {
        Self
    }
}

fn samples(host: &str, services: &[ServiceStatus]) -> Vec<Sample> {
    let mut set = SampleSet::new();
    for svc in services {
        set.set(&UP, &[host, &svc.name], bool_to_f64(svc.status));
        set.set(&ENABLED, &[host, &svc.name], bool_to_f64(svc.enabled));
    }
    set.into_samples()
}

#[async_trait::async_trait]
impl Collector for ServiceCollector {
    fn name(&self) -> &str {
        "service"
    }

    fn describe(&self) -> &[MetricDesc] {
        METRICS
    }

    async fn collect(&self, client: &ApiClient) -> Result<Vec<Sample>, CollectorError> {
        let services: Vec<ServiceStatus> = fetch_data(client, PATH).await?;
        Ok(samples(&client.target().host, &services))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(samples: &[Sample], metric: &str, service: &str) -> Option<f64> {
        samples
            .iter()
            .find(|s| s.desc.name == metric && s.label("name") == Some(service))
            .map(|s| s.value)
    }

    #[test]
    fn test_service_samples() {
        let services: Vec<ServiceStatus> = serde_json::from_value(serde_json::json!([
            {"name": "unbound", "description": "DNS Resolver", "enabled": true, "status": true},
            {"name": "ntpd", "enabled": true, "status": false},
            {"name": "openvpn", "enabled": false, "status": false}
        ]))
        .unwrap();

        let samples = samples("fw1", &services);

        assert_eq!(samples.len(), 6);
        assert_eq!(value(&samples, "service_up", "unbound"), Some(1.0));
        assert_eq!(value(&samples, "service_enabled", "unbound"), Some(1.0));
        assert_eq!(value(&samples, "service_up", "ntpd"), Some(0.0));
        assert_eq!(value(&samples, "service_enabled", "ntpd"), Some(1.0));
        assert_eq!(value(&samples, "service_enabled", "openvpn"), Some(0.0));
    }

    #[test]
    fn test_service_null_fields_decode_as_defaults() {
        let services: Vec<ServiceStatus> = serde_json::from_value(serde_json::json!([
            {"name": "dpinger", "enabled": null, "status": true}
        ]))
        .unwrap();

        let samples = samples("fw1", &services);

        assert_eq!(value(&samples, "service_up", "dpinger"), Some(1.0));
        assert_eq!(value(&samples, "service_enabled", "dpinger"), Some(0.0));
    }
}
