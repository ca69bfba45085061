//! Firewall state table collector.

use serde::Deserialize;

use crate::client::ApiClient;
use crate::collector::convert::usage_ratio;
use crate::collector::{
    Collector, CollectorError, MetricDesc, Sample, SampleSet, fetch_data, null_default,
};

const PATH: &str = "/api/v2/firewall/states/size";

const MAXIMUM: MetricDesc = MetricDesc::new(
    "firewall_states_maximum_count",
    "Maximum number of firewall states allowed by the host.",
    &["host"],
);
const CURRENT: MetricDesc = MetricDesc::new(
    "firewall_states_current_count",
    "Current number of firewall states registered on the host.",
    &["host"],
);
const USAGE: MetricDesc = MetricDesc::new(
    "firewall_states_usage_ratio",
    "Ratio of firewall states currently in use as a decimal percentage (0.0-1.0).",
    &["host"],
);

const METRICS: &[MetricDesc] = &[MAXIMUM, CURRENT, USAGE];

/// State table size. `maximumstates` is 0 when the default limit applies.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FirewallStatesStats {
    #[serde(rename = "maximumstates", deserialize_with = "null_default")]
    pub maximum_states: f64,
    #[serde(rename = "defaultmaximumstates", deserialize_with = "null_default")]
    pub default_maximum_states: f64,
    #[serde(rename = "currentstates", deserialize_with = "null_default")]
    pub current_states: f64,
}

/// State table limit, current size and usage ratio.
#[derive(Debug, Default)]
pub struct FirewallStatesCollector;

impl FirewallStatesCollector {
    pub fn new() -> Self {
        Self
    }
}

fn samples(host: &str, stats: &FirewallStatesStats) -> Vec<Sample> {
    let (maximum, ratio) = usage_ratio(
        stats.current_states,
        stats.maximum_states,
        stats.default_maximum_states,
    );

    let mut set = SampleSet::new();
    set.set(&MAXIMUM, &[host], maximum);
    set.set(&CURRENT, &[host], stats.current_states);
    match ratio {
        Some(ratio) => set.set(&USAGE, &[host], ratio),
        None => tracing::warn!(
            host = %host,
            "No firewall state limit reported, omitting usage ratio"
        ),
    }
    set.into_samples()
}

#[async_trait::async_trait]
impl Collector for FirewallStatesCollector {
    fn name(&self) -> &str {
        "firewall_states"
    }

    fn describe(&self) -> &[MetricDesc] {
        METRICS
    }

    async fn collect(&self, client: &ApiClient) -> Result<Vec<Sample>, CollectorError> {
        let stats: FirewallStatesStats = fetch_data(client, PATH).await?;
        Ok(samples(&client.target().host, &stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(samples: &[Sample], name: &str) -> Option<f64> {
        samples
            .iter()
            .find(|s| s.desc.name == name)
            .map(|s| s.value)
    }

    #[test]
    fn test_states_default_maximum_fallback() {
        let stats: FirewallStatesStats = serde_json::from_value(serde_json::json!({
            "maximumstates": 0,
            "defaultmaximumstates": 75000,
            "currentstates": 30000
        }))
        .unwrap();

        let samples = samples("fw1", &stats);

        assert_eq!(value(&samples, "firewall_states_maximum_count"), Some(75_000.0));
        assert_eq!(value(&samples, "firewall_states_current_count"), Some(30_000.0));
        assert_eq!(value(&samples, "firewall_states_usage_ratio"), Some(0.4));
    }

    #[test]
    fn test_states_explicit_maximum() {
        let stats = FirewallStatesStats {
            maximum_states: 200_000.0,
            default_maximum_states: 75_000.0,
            current_states: 50_000.0,
        };

        let samples = samples("fw1", &stats);

        assert_eq!(value(&samples, "firewall_states_maximum_count"), Some(200_000.0));
        assert_eq!(value(&samples, "firewall_states_usage_ratio"), Some(0.25));
    }

    #[test]
    fn test_states_no_maximum_omits_ratio() {
        let stats = FirewallStatesStats {
            current_states: 42.0,
            ..Default::default()
        };

        let samples = samples("fw1", &stats);

        assert_eq!(samples.len(), 2);
        assert_eq!(value(&samples, "firewall_states_maximum_count"), Some(0.0));
        assert_eq!(value(&samples, "firewall_states_current_count"), Some(42.0));
        assert_eq!(value(&samples, "firewall_states_usage_ratio"), None);
    }

    #[test]
    fn test_states_null_maximum_falls_back_to_default() {
        let stats: FirewallStatesStats = serde_json::from_value(serde_json::json!({
            "maximumstates": null,
            "defaultmaximumstates": 1000,
            "currentstates": 250
        }))
        .unwrap();

        let samples = samples("fw1", &stats);

        assert_eq!(value(&samples, "firewall_states_maximum_count"), Some(1000.0));
        assert_eq!(value(&samples, "firewall_states_usage_ratio"), Some(0.25));
    }
}
