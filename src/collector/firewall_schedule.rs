//! Firewall schedule collector.

use serde::Deserialize;

use crate::client::ApiClient;
use crate::collector::convert::bool_to_f64;
use crate::collector::{
    Collector, CollectorError, MetricDesc, Sample, SampleSet, fetch_data, null_default,
};

const PATH: &str = "/api/v2/firewall/schedules";

const ACTIVE: MetricDesc = MetricDesc::new(
    "firewall_schedule_active",
    "Whether the firewall schedule is active (1) or inactive (0).",
    &["host", "name"],
);

const METRICS: &[MetricDesc] = &[ACTIVE];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FirewallSchedule {
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    #[serde(deserialize_with = "null_default")]
    pub active: bool,
}

/// Active state of each firewall schedule.
#[derive(Debug, Default)]
pub struct FirewallScheduleCollector;

impl FirewallScheduleCollector {
    pub fn new() -> Self {
        Self
    }
}

fn samples(host: &str, schedules: &[FirewallSchedule]) -> Vec<Sample> {
    let mut set = SampleSet::new();
    for schedule in schedules {
        set.set(&ACTIVE, &[host, &schedule.name], bool_to_f64(schedule.active));
    }
    set.into_samples()
}

#[async_trait::async_trait]
impl Collector for FirewallScheduleCollector {
    fn name(&self) -> &str {
        "firewall_schedule"
    }

    fn describe(&self) -> &[MetricDesc] {
        METRICS
    }

    async fn collect(&self, client: &ApiClient) -> Result<Vec<Sample>, CollectorError> {
        let schedules: Vec<FirewallSchedule> = fetch_data(client, PATH).await?;
        Ok(samples(&client.target().host, &schedules))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_samples() {
        let schedules: Vec<FirewallSchedule> = serde_json::from_value(serde_json::json!([
            {"name": "business_hours", "active": true, "timerange": []},
            {"name": "weekend", "active": false}
        ]))
        .unwrap();

        let samples = samples("fw1", &schedules);

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].label("name"), Some("business_hours"));
        assert_eq!(samples[0].value, 1.0);
        assert_eq!(samples[1].label("name"), Some("weekend"));
        assert_eq!(samples[1].value, 0.0);
    }

    #[test]
    fn test_schedule_duplicate_names_collapse() {
        let schedules = vec![
            FirewallSchedule {
                name: "dup".to_string(),
                active: false,
            },
            FirewallSchedule {
                name: "dup".to_string(),
                active: true,
            },
        ];
        let samples = samples("fw1", &schedules);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].value, 1.0);
    }

    #[test]
    fn test_schedule_null_fields_decode_as_defaults() {
        let schedules: Vec<FirewallSchedule> = serde_json::from_value(serde_json::json!([
            {"name": "maintenance", "active": null}
        ]))
        .unwrap();

        let samples = samples("fw1", &schedules);

        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].label("name"), Some("maintenance"));
        assert_eq!(samples[0].value, 0.0);
    }
}
