//! Login protection (sshguard) collector.

use serde::Deserialize;

use crate::client::ApiClient;
use crate::collector::{
    Collector, CollectorError, MetricDesc, Sample, SampleSet, fetch_data, null_default,
};

const PATH: &str = "/api/v2/diagnostics/table?id=sshguard";

const BLOCKED_IP: MetricDesc = MetricDesc::new(
    "login_protection_blocked_ip",
    "Contains details about IPs blocked by Login Protection.",
    &["host", "ip"],
);
const BLOCKED_IP_COUNT: MetricDesc = MetricDesc::new(
    "login_protection_blocked_ip_count",
    "Current number of IPs actively blocked by Login Protection.",
    &["host"],
);

const METRICS: &[MetricDesc] = &[BLOCKED_IP, BLOCKED_IP_COUNT];

/// Contents of a pf table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PfTable {
    #[serde(deserialize_with = "null_default")]
    pub id: String,
    #[serde(deserialize_with = "null_default")]
    pub entries: Vec<String>,
}

#[derive(Debug, Default)]
pub struct LoginProtectionCollector;

impl LoginProtectionCollector {
    pub fn new() -> Self {
        Self
    }
}

fn samples(host: &str, table: &PfTable) -> Vec<Sample> {
    let mut set = SampleSet::new();
    for ip in &table.entries {
        set.set(&BLOCKED_IP, &[host, ip], 1.0);
    }
    set.set(&BLOCKED_IP_COUNT, &[host], table.entries.len() as f64);
    set.into_samples()
}

#[async_trait::async_trait]
impl Collector for LoginProtectionCollector {
    fn name(&self) -> &str {
        "login_protection"
    }

    fn describe(&self) -> &[MetricDesc] {
        METRICS
    }

    async fn collect(&self, client: &ApiClient) -> Result<Vec<Sample>, CollectorError> {
        let table: PfTable = fetch_data(client, PATH).await?;
        Ok(samples(&client.target().host, &table))
    }
}
