//! Network interface collector.

use serde::Deserialize;

use crate::client::ApiClient;
use crate::collector::convert::interface_status_to_f64;
use crate::collector::{
    Collector, CollectorError, MetricDesc, Sample, SampleSet, fetch_data, null_default,
};

const PATH: &str = "/api/v2/status/interfaces";

const LABELS: &[&str] = &["host", "name", "descr", "hwif"];

const UP: MetricDesc = MetricDesc::new(
    "interface_up",
    "Whether the interface is up (1) or down (0).",
    &["host", "name", "descr", "hwif", "status"],
);
const IN_ERRS: MetricDesc = MetricDesc::new(
    "interface_in_errs_count",
    "The number of input errors on the interface.",
    LABELS,
);
const OUT_ERRS: MetricDesc = MetricDesc::new(
    "interface_out_errs_count",
    "The number of output errors on the interface.",
    LABELS,
);
const COLLISIONS: MetricDesc = MetricDesc::new(
    "interface_collisions_count",
    "The number of collisions on the interface.",
    LABELS,
);
const IN_BYTES: MetricDesc = MetricDesc::new(
    "interface_in_bytes",
    "The number of input bytes on the interface.",
    LABELS,
);
const IN_PASS_BYTES: MetricDesc = MetricDesc::new(
    "interface_in_pass_bytes",
    "The number of input bytes passed on the interface.",
    LABELS,
);
const OUT_BYTES: MetricDesc = MetricDesc::new(
    "interface_out_bytes",
    "The number of output bytes on the interface.",
    LABELS,
);
const OUT_PASS_BYTES: MetricDesc = MetricDesc::new(
    "interface_out_pass_bytes",
    "The number of output bytes passed on the interface.",
    LABELS,
);
const IN_PKTS: MetricDesc = MetricDesc::new(
    "interface_in_pkts_count",
    "The number of input packets handled by the interface.",
    LABELS,
);
const IN_PASS_PKTS: MetricDesc = MetricDesc::new(
    "interface_in_pass_pkts_count",
    "The number of input packets passed on the interface.",
    LABELS,
);
const OUT_PKTS: MetricDesc = MetricDesc::new(
    "interface_out_pkts_count",
    "The number of output packets handled by the interface.",
    LABELS,
);
const OUT_PASS_PKTS: MetricDesc = MetricDesc::new(
    "interface_out_pass_pkts_count",
    "The number of output packets passed on the interface.",
    LABELS,
);

const METRICS: &[MetricDesc] = &[
    UP,
    IN_ERRS,
    OUT_ERRS,
    COLLISIONS,
    IN_BYTES,
    IN_PASS_BYTES,
    OUT_BYTES,
    OUT_PASS_BYTES,
    IN_PKTS,
    IN_PASS_PKTS,
    OUT_PKTS,
    OUT_PASS_PKTS,
];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InterfaceStatus {
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    #[serde(deserialize_with = "null_default")]
    pub descr: String,
    #[serde(deserialize_with = "null_default")]
    pub hwif: String,
    #[serde(deserialize_with = "null_default")]
    pub status: String,
    #[serde(rename = "inerrs", deserialize_with = "null_default")]
    pub in_errs: f64,
    #[serde(rename = "outerrs", deserialize_with = "null_default")]
    pub out_errs: f64,
    #[serde(deserialize_with = "null_default")]
    pub collisions: f64,
    #[serde(rename = "inbytes", deserialize_with = "null_default")]
    pub in_bytes: f64,
    #[serde(rename = "inbytespass", deserialize_with = "null_default")]
    pub in_bytes_pass: f64,
    #[serde(rename = "outbytes", deserialize_with = "null_default")]
    pub out_bytes: f64,
    #[serde(rename = "outbytespass", deserialize_with = "null_default")]
    pub out_bytes_pass: f64,
    #[serde(rename = "inpkts", deserialize_with = "null_default")]
    pub in_pkts: f64,
    #[serde(rename = "inpktspass", deserialize_with = "null_default")]
    pub in_pkts_pass: f64,
    #[serde(rename = "outpkts", deserialize_with = "null_default")]
    pub out_pkts: f64,
    #[serde(rename = "outpktspass", deserialize_with = "null_default")]
    pub out_pkts_pass: f64,
}

/// Link state and traffic counters per interface.
#[derive(Debug, Default)]
pub struct InterfaceCollector;

impl InterfaceCollector {
    pub fn new() -> Self {
        Self
    }
}

fn samples(host: &str, interfaces: &[InterfaceStatus]) -> Vec<Sample> {
    let mut set = SampleSet::new();
    for iface in interfaces {
        set.set(
            &UP,
            &[host, &iface.name, &iface.descr, &iface.hwif, &iface.status],
            interface_status_to_f64(&iface.status),
        );

        let labels: [&str; 4] = [host, &iface.name, &iface.descr, &iface.hwif];
        for (desc, value) in [
            (&IN_ERRS, iface.in_errs),
            (&OUT_ERRS, iface.out_errs),
            (&COLLISIONS, iface.collisions),
            (&IN_BYTES, iface.in_bytes),
            (&IN_PASS_BYTES, iface.in_bytes_pass),
            (&OUT_BYTES, iface.out_bytes),
            (&OUT_PASS_BYTES, iface.out_bytes_pass),
            (&IN_PKTS, iface.in_pkts),
            (&IN_PASS_PKTS, iface.in_pkts_pass),
            (&OUT_PKTS, iface.out_pkts),
            (&OUT_PASS_PKTS, iface.out_pkts_pass),
        ] {
            set.set(desc, &labels, value);
        }
    }
    set.into_samples()
}

#[async_trait::async_trait]
impl Collector for InterfaceCollector {
    fn name(&self) -> &str {
        "interface"
    }

    fn describe(&self) -> &[MetricDesc] {
        METRICS
    }

    async fn collect(&self, client: &ApiClient) -> Result<Vec<Sample>, CollectorError> {
        let interfaces: Vec<InterfaceStatus> = fetch_data(client, PATH).await?;
        Ok(samples(&client.target().host, &interfaces))
    }
}
