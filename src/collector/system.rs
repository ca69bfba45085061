//! System status collector.

use serde::Deserialize;

use crate::client::ApiClient;
use crate::collector::convert::percent_to_ratio;
use crate::collector::{
    Collector, CollectorError, MetricDesc, Sample, SampleSet, fetch_data, null_default,
};

const PATH: &str = "/api/v2/status/system";

const TEMPERATURE: MetricDesc = MetricDesc::new(
    "system_temperature_celsius",
    "Current system temperature in Celsius.",
    &["host"],
);
const CPU_COUNT: MetricDesc = MetricDesc::new(
    "system_cpu_count",
    "Number of CPU cores available on the system.",
    &["host"],
);
const CPU_USAGE: MetricDesc = MetricDesc::new(
    "system_cpu_usage_ratio",
    "Current CPU usage as a decimal percentage (0.0 - 1.0).",
    &["host"],
);
const DISK_USAGE: MetricDesc = MetricDesc::new(
    "system_disk_usage_ratio",
    "Current disk usage as a decimal percentage (0.0 - 1.0).",
    &["host"],
);
const MEMORY_USAGE: MetricDesc = MetricDesc::new(
    "system_memory_usage_ratio",
    "Current memory usage as a decimal percentage (0.0 - 1.0).",
    &["host"],
);
const SWAP_USAGE: MetricDesc = MetricDesc::new(
    "system_swap_usage_ratio",
    "Current swap usage as a decimal percentage (0.0 - 1.0).",
    &["host"],
);
const MBUF_USAGE: MetricDesc = MetricDesc::new(
    "system_mbuf_usage_ratio",
    "Current mbuf usage as a decimal percentage (0.0 - 1.0).",
    &["host"],
);

const METRICS: &[MetricDesc] = &[
    TEMPERATURE,
    CPU_COUNT,
    CPU_USAGE,
    DISK_USAGE,
    MEMORY_USAGE,
    SWAP_USAGE,
    MBUF_USAGE,
];

/// System status payload. Usage fields are percentages.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SystemStats {
    #[serde(deserialize_with = "null_default")]
    pub temp_c: f64,
    #[serde(deserialize_with = "null_default")]
    pub cpu_count: f64,
    #[serde(deserialize_with = "null_default")]
    pub cpu_usage: f64,
    #[serde(deserialize_with = "null_default")]
    pub disk_usage: f64,
    #[serde(deserialize_with = "null_default")]
    pub mem_usage: f64,
    #[serde(deserialize_with = "null_default")]
    pub swap_usage: f64,
    #[serde(deserialize_with = "null_default")]
    pub mbuf_usage: f64,
}

/// Temperature, CPU count and resource usage ratios.
#[derive(Debug, Default)]
pub struct SystemCollector;

impl SystemCollector {
    pub fn new() -> Self {
        Self
    }
}

fn samples(host: &str, stats: &SystemStats) -> Vec<Sample> {
    let mut set = SampleSet::new();
    set.set(&TEMPERATURE, &[host], stats.temp_c);
    set.set(&CPU_COUNT, &[host], stats.cpu_count);
    set.set(&CPU_USAGE, &[host], percent_to_ratio(stats.cpu_usage));
    set.set(&DISK_USAGE, &[host], percent_to_ratio(stats.disk_usage));
    set.set(&MEMORY_USAGE, &[host], percent_to_ratio(stats.mem_usage));
    set.set(&SWAP_USAGE, &[host], percent_to_ratio(stats.swap_usage));
    set.set(&MBUF_USAGE, &[host], percent_to_ratio(stats.mbuf_usage));
    set.into_samples()
}

#[async_trait::async_trait]
impl Collector for SystemCollector {
    fn name(&self) -> &str {
        "system"
    }

    fn describe(&self) -> &[MetricDesc] {
        METRICS
    }

    async fn collect(&self, client: &ApiClient) -> Result<Vec<Sample>, CollectorError> {
        let stats: SystemStats = fetch_data(client, PATH).await?;
        Ok(samples(&client.target().host, &stats))
    }
}
