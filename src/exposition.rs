//! Prometheus text exposition of scrape results.
//!
//! Every scrape gets its own [`prometheus::Registry`], so no series survives
//! from one scrape to the next and concurrent scrapes never share state.

use std::collections::HashMap;

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use thiserror::Error;

use crate::collector::{METRICS_NAMESPACE, MetricDesc, Sample};

/// Content type of the exposition body.
pub const CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

/// Errors raised while rendering a scrape.
#[derive(Debug, Error)]
pub enum ExpositionError {
    #[error("metric error: {0}")]
    Metric(#[from] prometheus::Error),

    #[error("exposition is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Render samples in the Prometheus text format.
///
/// `descs` declares the gauges; a sample whose metric is not declared, or
/// whose label values do not fit its declaration, is logged and skipped.
/// Declared gauges without samples are omitted from the output.
pub fn encode(descs: &[MetricDesc], samples: &[Sample]) -> Result<String, ExpositionError> {
    let registry = Registry::new();
    let mut gauges: HashMap<&'static str, GaugeVec> = HashMap::with_capacity(descs.len());

    for desc in descs {
        if gauges.contains_key(desc.name) {
            tracing::warn!(metric = desc.name, "Duplicate metric description, ignoring");
            continue;
        }
        let opts = Opts::new(desc.name, desc.help).namespace(METRICS_NAMESPACE);
        let gauge = GaugeVec::new(opts, desc.labels)?;
        registry.register(Box::new(gauge.clone()))?;
        gauges.insert(desc.name, gauge);
    }

    for sample in samples {
        let Some(gauge) = gauges.get(sample.desc.name) else {
            tracing::warn!(metric = sample.desc.name, "Sample for undeclared metric, skipping");
            continue;
        };
        let values: Vec<&str> = sample.label_values.iter().map(String::as_str).collect();
        match gauge.get_metric_with_label_values(&values) {
            Ok(series) => series.set(sample.value),
            Err(e) => {
                tracing::warn!(metric = sample.desc.name, error = %e, "Invalid sample, skipping");
            }
        }
    }

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
