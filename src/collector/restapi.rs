//! REST API package version collector.

use serde::Deserialize;

use crate::client::ApiClient;
use crate::collector::convert::bool_to_f64;
use crate::collector::{
    Collector, CollectorError, MetricDesc, Sample, SampleSet, fetch_data, null_default,
};

const PATH: &str = "/api/v2/system/restapi/version";

const UPDATE_AVAILABLE: MetricDesc = MetricDesc::new(
    "restapi_update_available",
    "Whether a REST API update is available (1 = available, 0 = not available).",
    &[
        "host",
        "current_version",
        "latest_version",
        "latest_version_release_date",
    ],
);

const METRICS: &[MetricDesc] = &[UPDATE_AVAILABLE];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RestApiVersion {
    #[serde(deserialize_with = "null_default")]
    pub update_available: bool,
    #[serde(deserialize_with = "null_default")]
    pub current_version: String,
    #[serde(deserialize_with = "null_default")]
    pub latest_version: String,
    #[serde(deserialize_with = "null_default")]
    pub latest_version_release_date: String,
}

#[derive(Debug, Default)]
pub struct RestApiCollector;

impl RestApiCollector {
    pub fn new() -> Self {
        Self
    }
}

fn samples(host: &str, version: &RestApiVersion) -> Vec<Sample> {
    let mut set = SampleSet::new();
    set.set(
        &UPDATE_AVAILABLE,
        &[
            host,
            &version.current_version,
            &version.latest_version,
            &version.latest_version_release_date,
        ],
        bool_to_f64(version.update_available),
    );
    set.into_samples()
}

#[async_trait::async_trait]
impl Collector for RestApiCollector {
    fn name(&self) -> &str {
        "restapi"
    }

    fn describe(&self) -> &[MetricDesc] {
        METRICS
    }

    async fn collect(&self, client: &ApiClient) -> Result<Vec<Sample>, CollectorError> {
        let version: RestApiVersion = fetch_data(client, PATH).await?;
        Ok(samples(&client.target().host, &version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restapi_update_available() {
        let version: RestApiVersion = serde_json::from_value(serde_json::json!({
            "update_available": true,
            "current_version": "v2.3.0",
            "latest_version": "v2.4.3",
            "latest_version_release_date": "2025-04-10T18:33:27Z",
            "install_version": ""
        }))
        .unwrap();

        let samples = samples("fw1", &version);

        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].value, 1.0);
        assert_eq!(samples[0].label("current_version"), Some("v2.3.0"));
        assert_eq!(samples[0].label("latest_version"), Some("v2.4.3"));
        assert_eq!(
            samples[0].label("latest_version_release_date"),
            Some("2025-04-10T18:33:27Z")
        );
    }

    #[test]
    fn test_restapi_up_to_date() {
        let version = RestApiVersion {
            current_version: "v2.4.3".to_string(),
            latest_version: "v2.4.3".to_string(),
            ..Default::default()
        };
        assert_eq!(samples("fw1", &version)[0].value, 0.0);
    }

    #[test]
    fn test_restapi_null_fields_decode_as_defaults() {
        let version: RestApiVersion = serde_json::from_value(serde_json::json!({
            "update_available": null,
            "current_version": "v2.4.3",
            "latest_version": "v2.4.3",
            "latest_version_release_date": null
        }))
        .unwrap();

        let samples = samples("fw1", &version);

        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].value, 0.0);
        assert_eq!(samples[0].label("latest_version_release_date"), Some(""));
    }
}
