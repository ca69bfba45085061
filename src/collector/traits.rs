//! Core collector traits and types.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::client::{ApiClient, ClientError};

/// Namespace prepended to every exported metric name.
pub const METRICS_NAMESPACE: &str = "pfsense";

/// Errors that can occur during collection.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// The API request failed.
    #[error("failed to fetch {path}: {source}")]
    Request {
        path: &'static str,
        #[source]
        source: ClientError,
    },

    /// The envelope carried no payload.
    #[error("received empty response from {path}")]
    EmptyPayload { path: &'static str },

    /// The payload did not match the expected shape.
    #[error("failed to decode response from {path}: {source}")]
    Payload {
        path: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Static description of one exported gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDesc {
    /// Metric name without the namespace prefix.
    pub name: &'static str,
    /// Help text.
    pub help: &'static str,
    /// Label names, `host` first.
    pub labels: &'static [&'static str],
}

impl MetricDesc {
    /// Create a metric description.
    pub const fn new(
        name: &'static str,
        help: &'static str,
        labels: &'static [&'static str],
    ) -> Self {
        Self { name, help, labels }
    }

    /// Fully qualified metric name, e.g. `pfsense_system_cpu_count`.
    pub fn fq_name(&self) -> String {
        format!("{}_{}", METRICS_NAMESPACE, self.name)
    }
}

/// One gauge value with its label values.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Description of the metric this sample belongs to.
    pub desc: MetricDesc,
    /// Label values, in the order of `desc.labels`.
    pub label_values: Vec<String>,
    /// Gauge value.
    pub value: f64,
}

impl Sample {
    /// Look up a label value by label name.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.desc
            .labels
            .iter()
            .position(|l| *l == name)
            .and_then(|idx| self.label_values.get(idx))
            .map(String::as_str)
    }
}

/// Per-invocation sample builder.
///
/// Holds at most one sample per metric and label-set; setting the same series
/// twice keeps the last value in its original position.
#[derive(Debug, Default)]
pub struct SampleSet {
    samples: Vec<Sample>,
    index: HashMap<(&'static str, Vec<String>), usize>,
}

impl SampleSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value of one series.
    ///
    /// Label values must match `desc.labels` in count; mismatched writes are
    /// logged and dropped.
    pub fn set(&mut self, desc: &MetricDesc, label_values: &[&str], value: f64) {
        if label_values.len() != desc.labels.len() {
            tracing::warn!(
                metric = desc.name,
                expected = desc.labels.len(),
                got = label_values.len(),
                "Label count mismatch, dropping sample"
            );
            return;
        }

        let values: Vec<String> = label_values.iter().map(|v| (*v).to_string()).collect();
        match self.index.get(&(desc.name, values.clone())) {
            Some(&idx) => self.samples[idx].value = value,
            None => {
                self.index.insert((desc.name, values.clone()), self.samples.len());
                self.samples.push(Sample {
                    desc: *desc,
                    label_values: values,
                    value,
                });
            }
        }
    }

    /// Number of distinct series.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no series have been set.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Consume the builder.
    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}

/// Core collector trait.
///
/// A collector maps one API resource to a fixed set of gauges. It keeps no
/// per-scrape state: each call to `collect()` builds and returns a fresh
/// sample set, so one instance can serve simultaneous scrapes.
///
/// # Error Handling
///
/// Errors are returned rather than logged here. The master collector logs
/// them with the collector name and target host, and treats the collector as
/// having produced zero samples for that scrape.
#[async_trait::async_trait]
pub trait Collector: Send + Sync + 'static {
    /// Unique name, matched against the target allow-list.
    fn name(&self) -> &str;

    /// Static metric descriptions. No I/O.
    fn describe(&self) -> &[MetricDesc];

    /// Fetch the resource from the client's target and convert it to samples.
    async fn collect(&self, client: &ApiClient) -> Result<Vec<Sample>, CollectorError>;
}

/// Fetch `path` and decode the envelope payload as `T`.
///
/// # Errors
/// `Request` on client failure, `EmptyPayload` for a null or absent `data`
/// field, `Payload` if `data` has the wrong shape.
pub async fn fetch_data<T: DeserializeOwned>(
    client: &ApiClient,
    path: &'static str,
) -> Result<T, CollectorError> {
    let envelope = client
        .get(path)
        .await
        .map_err(|source| CollectorError::Request { path, source })?;
    decode_data(envelope.data, path)
}

/// Decode an envelope payload as `T`.
pub fn decode_data<T: DeserializeOwned>(
    data: Option<serde_json::Value>,
    path: &'static str,
) -> Result<T, CollectorError> {
    let data = data.ok_or(CollectorError::EmptyPayload { path })?;
    serde_json::from_value(data).map_err(|source| CollectorError::Payload { path, source })
}

/// Field deserializer that reads an explicit `null` as `T::default()`.
///
/// The appliance sends `null` for unset fields (no temperature sensor, no
/// interface description). `#[serde(default)]` only covers absent keys.
pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UP: MetricDesc = MetricDesc::new("test_up", "Test gauge.", &["host", "name"]);

    #[test]
    fn test_metric_desc_fq_name() {
        assert_eq!(UP.fq_name(), "pfsense_test_up");
    }

    #[test]
    fn test_sample_set_replaces_same_series() {
        let mut set = SampleSet::new();
        set.set(&UP, &["fw1", "wan"], 1.0);
        set.set(&UP, &["fw1", "lan"], 0.0);
        set.set(&UP, &["fw1", "wan"], 0.5);

        let samples = set.into_samples();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].label("name"), Some("wan"));
        assert_eq!(samples[0].value, 0.5);
        assert_eq!(samples[1].label("name"), Some("lan"));
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Nullable {
        #[serde(deserialize_with = "null_default")]
        name: String,
        #[serde(deserialize_with = "null_default")]
        value: f64,
        #[serde(deserialize_with = "null_default")]
        flag: bool,
        #[serde(deserialize_with = "null_default")]
        items: Vec<String>,
    }

    #[test]
    fn test_null_default_reads_null_as_default() {
        let decoded: Nullable = decode_data(
            Some(serde_json::json!({"name": null, "value": null, "flag": null, "items": null})),
            "/test",
        )
        .unwrap();
        assert_eq!(decoded.name, "");
        assert_eq!(decoded.value, 0.0);
        assert!(!decoded.flag);
        assert!(decoded.items.is_empty());
    }

    #[test]
    fn test_null_default_keeps_values_and_absent_keys() {
        let decoded: Nullable =
            decode_data(Some(serde_json::json!({"name": "wan", "value": 2.5})), "/test").unwrap();
        assert_eq!(decoded.name, "wan");
        assert_eq!(decoded.value, 2.5);
        assert!(decoded.items.is_empty());
    }

    #[test]
    fn test_null_default_still_rejects_wrong_type() {
        let err = decode_data::<Nullable>(Some(serde_json::json!({"value": "hot"})), "/test")
            .unwrap_err();
        assert!(matches!(err, CollectorError::Payload { .. }));
    }

    #[test]
    fn test_sample_set_drops_label_mismatch() {
        let mut set = SampleSet::new();
        set.set(&UP, &["fw1"], 1.0);
        assert!(set.is_empty());
    }

    #[test]
    fn test_sample_label_lookup() {
        let mut set = SampleSet::new();
        set.set(&UP, &["fw1", "wan"], 1.0);
        let sample = &set.into_samples()[0];
        assert_eq!(sample.label("host"), Some("fw1"));
        assert_eq!(sample.label("missing"), None);
    }

    #[test]
    fn test_decode_data_empty() {
        let result: Result<Vec<String>, _> = decode_data(None, "/api/v2/test");
        assert!(matches!(
            result,
            Err(CollectorError::EmptyPayload {
                path: "/api/v2/test"
            })
        ));
    }

    #[test]
    fn test_decode_data_wrong_shape() {
        let result: Result<Vec<String>, _> =
            decode_data(Some(serde_json::json!({"not": "a list"})), "/api/v2/test");
        let err = result.unwrap_err();
        assert!(matches!(err, CollectorError::Payload { .. }));
        assert!(err.to_string().contains("/api/v2/test"));
    }
}
