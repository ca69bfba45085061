//! Installed package collector.

use serde::Deserialize;

use crate::client::ApiClient;
use crate::collector::convert::bool_to_f64;
use crate::collector::{
    Collector, CollectorError, MetricDesc, Sample, SampleSet, fetch_data, null_default,
};

const PATH: &str = "/api/v2/system/packages";

const UPDATE_AVAILABLE: MetricDesc = MetricDesc::new(
    "package_update_available",
    "Whether an update is available for the package (1) or not (0).",
    &["host", "name", "shortname", "installed_version", "latest_version"],
);

const METRICS: &[MetricDesc] = &[UPDATE_AVAILABLE];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Package {
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    #[serde(deserialize_with = "null_default")]
    pub shortname: String,
    #[serde(deserialize_with = "null_default")]
    pub installed_version: String,
    #[serde(deserialize_with = "null_default")]
    pub latest_version: String,
    #[serde(deserialize_with = "null_default")]
    pub update_available: bool,
}

/// Update availability per installed package.
#[derive(Debug, Default)]
pub struct PackageCollector;

impl PackageCollector {
    pub fn new() -> Self {
        Self
    }
}

fn samples(host: &str, packages: &[Package]) -> Vec<Sample> {
    let mut set = SampleSet::new();
    for pkg in packages {
        set.set(
            &UPDATE_AVAILABLE,
            &[
                host,
                &pkg.name,
                &pkg.shortname,
                &pkg.installed_version,
                &pkg.latest_version,
            ],
            bool_to_f64(pkg.update_available),
        );
    }
    set.into_samples()
}

#[async_trait::async_trait]
impl Collector for PackageCollector {
    fn name(&self) -> &str {
        "package"
    }

    fn describe(&self) -> &[MetricDesc] {
        METRICS
    }

    async fn collect(&self, client: &ApiClient) -> Result<Vec<Sample>, CollectorError> {
        let packages: Vec<Package> = fetch_data(client, PATH).await?;
        Ok(samples(&client.target().host, &packages))
    }
}
