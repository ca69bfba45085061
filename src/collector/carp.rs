//! CARP (Common Address Redundancy Protocol) collector.
//!
//! Polls two resources: the global CARP status and the CARP virtual IPs.
//! If either request fails the collector reports nothing for the scrape.

use serde::Deserialize;

use crate::client::ApiClient;
use crate::collector::convert::{bool_to_f64, carp_status_to_f64};
use crate::collector::{
    Collector, CollectorError, MetricDesc, Sample, SampleSet, fetch_data, null_default,
};

const STATUS_PATH: &str = "/api/v2/status/carp";
const VIRTUAL_IPS_PATH: &str = "/api/v2/firewall/virtual_ips?mode=carp";

const ENABLED: MetricDesc = MetricDesc::new(
    "carp_enabled",
    "Whether CARP is enabled (1 = enabled, 0 = disabled).",
    &["host"],
);
const MAINTENANCE_MODE: MetricDesc = MetricDesc::new(
    "carp_maintenance_mode_enabled",
    "Whether CARP maintenance mode is enabled (1 = enabled, 0 = disabled).",
    &["host"],
);
const VIRTUAL_IP_STATUS: MetricDesc = MetricDesc::new(
    "carp_virtual_ip_status",
    "CARP virtual IP status (1 = MASTER, 0 = BACKUP, -1 = OTHER).",
    &["host", "carp_status", "uniqid", "subnet", "vhid", "interface"],
);

const METRICS: &[MetricDesc] = &[ENABLED, MAINTENANCE_MODE, VIRTUAL_IP_STATUS];

/// Global CARP status.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CarpStats {
    #[serde(rename = "enable", deserialize_with = "null_default")]
    pub enabled: bool,
    #[serde(deserialize_with = "null_default")]
    pub maintenance_mode: bool,
}

/// One CARP virtual IP.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CarpVirtualIp {
    #[serde(deserialize_with = "null_default")]
    pub carp_status: String,
    #[serde(deserialize_with = "null_default")]
    pub uniqid: String,
    #[serde(deserialize_with = "null_default")]
    pub subnet: String,
    #[serde(deserialize_with = "null_default")]
    pub vhid: i64,
    #[serde(deserialize_with = "null_default")]
    pub interface: String,
}

/// CARP enablement, maintenance mode and per-VIP status.
#[derive(Debug, Default)]
pub struct CarpCollector;

impl CarpCollector {
    pub fn new() -> Self {
        Self
    }
}

fn samples(host: &str, stats: &CarpStats, virtual_ips: &[CarpVirtualIp]) -> Vec<Sample> {
    let mut set = SampleSet::new();
    set.set(&ENABLED, &[host], bool_to_f64(stats.enabled));
    set.set(&MAINTENANCE_MODE, &[host], bool_to_f64(stats.maintenance_mode));

    for vip in virtual_ips {
        let vhid = vip.vhid.to_string();
        set.set(
            &VIRTUAL_IP_STATUS,
            &[
                host,
                &vip.carp_status,
                &vip.uniqid,
                &vip.subnet,
                &vhid,
                &vip.interface,
            ],
            carp_status_to_f64(&vip.carp_status),
        );
    }
    set.into_samples()
}

#[async_trait::async_trait]
impl Collector for CarpCollector {
    fn name(&self) -> &str {
        "carp"
    }

    fn describe(&self) -> &[MetricDesc] {
        METRICS
    }

    async fn collect(&self, client: &ApiClient) -> Result<Vec<Sample>, CollectorError> {
        let stats: CarpStats = fetch_data(client, STATUS_PATH).await?;
        let virtual_ips: Vec<CarpVirtualIp> = fetch_data(client, VIRTUAL_IPS_PATH).await?;
        Ok(samples(&client.target().host, &stats, &virtual_ips))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn virtual_ips() -> Vec<CarpVirtualIp> {
        serde_json::from_value(serde_json::json!([
            {"carp_status": "master", "uniqid": "5f1a", "subnet": "10.0.0.10", "vhid": 1, "interface": "lan"},
            {"carp_status": "backup", "uniqid": "5f1b", "subnet": "10.0.1.10", "vhid": 2, "interface": "opt1"},
            {"carp_status": "init", "uniqid": "5f1c", "subnet": "10.0.2.10", "vhid": 3, "interface": "opt2"}
        ]))
        .unwrap()
    }

    #[test]
    fn test_carp_samples() {
        let stats: CarpStats =
            serde_json::from_value(serde_json::json!({"enable": true, "maintenance_mode": false}))
                .unwrap();

        let samples = samples("fw1", &stats, &virtual_ips());

        assert_eq!(samples.len(), 5);
        assert_eq!(samples[0].desc.name, "carp_enabled");
        assert_eq!(samples[0].value, 1.0);
        assert_eq!(samples[1].desc.name, "carp_maintenance_mode_enabled");
        assert_eq!(samples[1].value, 0.0);

        let vips: Vec<_> = samples
            .iter()
            .filter(|s| s.desc.name == "carp_virtual_ip_status")
            .collect();
        assert_eq!(vips.len(), 3);
        assert_eq!(vips[0].value, 1.0);
        assert_eq!(vips[0].label("vhid"), Some("1"));
        assert_eq!(vips[0].label("interface"), Some("lan"));
        assert_eq!(vips[1].value, 0.0);
        assert_eq!(vips[2].value, -1.0);
        assert_eq!(vips[2].label("carp_status"), Some("init"));
    }

    #[test]
    fn test_carp_no_virtual_ips() {
        let samples = samples("fw1", &CarpStats::default(), &[]);
        assert_eq!(samples.len(), 2);
    }

    #[test]
    fn test_carp_describe_includes_virtual_ips() {
        let collector = CarpCollector::new();
        assert_eq!(collector.name(), "carp");
        assert!(
            collector
                .describe()
                .iter()
                .any(|d| d.name == "carp_virtual_ip_status")
        );
    }

    #[test]
    fn test_carp_null_fields_decode_as_defaults() {
        let stats: CarpStats =
            serde_json::from_value(serde_json::json!({"enable": null, "maintenance_mode": null}))
                .unwrap();
        let vips: Vec<CarpVirtualIp> = serde_json::from_value(serde_json::json!([
            {"carp_status": "master", "uniqid": null, "subnet": "10.0.0.10", "vhid": null, "interface": "lan"}
        ]))
        .unwrap();

        let samples = samples("fw1", &stats, &vips);

        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].value, 0.0);
        assert_eq!(samples[2].value, 1.0);
        assert_eq!(samples[2].label("uniqid"), Some(""));
        assert_eq!(samples[2].label("vhid"), Some("0"));
    }
}
