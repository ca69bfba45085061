//! Gateway monitoring collector.
//!
//! dpinger reports loss as a percentage and delay/stddev in milliseconds;
//! both are exported in base units.

use serde::Deserialize;

use crate::client::ApiClient;
use crate::collector::convert::{gateway_status_to_f64, millis_to_seconds, percent_to_ratio};
use crate::collector::{
    Collector, CollectorError, MetricDesc, Sample, SampleSet, fetch_data, null_default,
};

const PATH: &str = "/api/v2/status/gateways";

const LOSS: MetricDesc = MetricDesc::new(
    "gateway_loss_ratio",
    "The loss ratio of the gateway as a decimal percentage (0.0 - 1.0).",
    &["host", "name", "srcip", "monitorip"],
);
const DELAY: MetricDesc = MetricDesc::new(
    "gateway_delay_seconds",
    "The delay of the gateway in seconds.",
    &["host", "name", "srcip", "monitorip"],
);
const STDDEV: MetricDesc = MetricDesc::new(
    "gateway_stddev_seconds",
    "The standard deviation of the gateway delay in seconds.",
    &["host", "name", "srcip", "monitorip"],
);
const UP: MetricDesc = MetricDesc::new(
    "gateway_up",
    "The status of the gateway (0 = down, 1 = up).",
    &["host", "name", "srcip", "monitorip", "substatus"],
);

const METRICS: &[MetricDesc] = &[LOSS, DELAY, STDDEV, UP];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GatewayStatus {
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    #[serde(deserialize_with = "null_default")]
    pub loss: f64,
    #[serde(deserialize_with = "null_default")]
    pub delay: f64,
    #[serde(deserialize_with = "null_default")]
    pub stddev: f64,
    #[serde(deserialize_with = "null_default")]
    pub status: String,
    #[serde(deserialize_with = "null_default")]
    pub substatus: String,
    #[serde(rename = "srcip", deserialize_with = "null_default")]
    pub source_ip: String,
    #[serde(rename = "monitorip", deserialize_with = "null_default")]
    pub monitor_ip: String,
}

/// Loss, delay, jitter and up state per gateway.
#[derive(Debug, Default)]
pub struct GatewayCollector;

impl GatewayCollector {
    pub fn new() -> Self {
        Self
    }
}

fn samples(host: &str, gateways: &[GatewayStatus]) -> Vec<Sample> {
    let mut set = SampleSet::new();
    for gw in gateways {
        let labels: [&str; 4] = [host, &gw.name, &gw.source_ip, &gw.monitor_ip];
        set.set(&LOSS, &labels, percent_to_ratio(gw.loss));
        set.set(&DELAY, &labels, millis_to_seconds(gw.delay));
        set.set(&STDDEV, &labels, millis_to_seconds(gw.stddev));
        set.set(
            &UP,
            &[host, &gw.name, &gw.source_ip, &gw.monitor_ip, &gw.substatus],
            gateway_status_to_f64(&gw.status),
        );
    }
    set.into_samples()
}

#[async_trait::async_trait]
impl Collector for GatewayCollector {
    fn name(&self) -> &str {
        "gateways"
    }

    fn describe(&self) -> &[MetricDesc] {
        METRICS
    }

    async fn collect(&self, client: &ApiClient) -> Result<Vec<Sample>, CollectorError> {
        let gateways: Vec<GatewayStatus> = fetch_data(client, PATH).await?;
        Ok(samples(&client.target().host, &gateways))
    }
}
