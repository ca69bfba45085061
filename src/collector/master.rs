//! Per-scrape orchestration of all registered collectors.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;

use crate::client::ApiClient;
use crate::collector::{Collector, CollectorRegistry, MetricDesc, Sample};

/// Runs every applicable collector for one target and merges their samples.
///
/// Collectors run as separate tasks. A semaphore sized by the target's
/// `max_collector_concurrency` bounds how many are fetching at once; the
/// allow-list check happens before a slot is taken, so skipped collectors
/// never occupy one. A failed or panicking collector contributes nothing and
/// never affects its siblings.
#[derive(Debug, Clone)]
pub struct MasterCollector {
    registry: Arc<CollectorRegistry>,
}

impl MasterCollector {
    /// Create a master collector over a shared registry.
    pub fn new(registry: Arc<CollectorRegistry>) -> Self {
        Self { registry }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &CollectorRegistry {
        &self.registry
    }

    /// Metric descriptions of every registered collector.
    pub fn describe(&self) -> Vec<MetricDesc> {
        self.registry.descriptions()
    }

    /// Names of the collectors that run for the client's target.
    pub fn applicable(&self, client: &ApiClient) -> Vec<&str> {
        self.registry
            .all()
            .iter()
            .map(|c| c.name())
            .filter(|name| client.target().allows(name))
            .collect()
    }

    /// Run one scrape and return the union of all collector samples.
    ///
    /// Returns only after every collector task has finished.
    pub async fn collect(&self, client: &ApiClient) -> Vec<Sample> {
        let target = client.target();
        let start = Instant::now();
        let semaphore = Arc::new(Semaphore::new(target.max_collector_concurrency));
        let (tx, mut rx) = mpsc::channel::<Sample>(target.max_collector_buffer_size);

        let mut tasks = JoinSet::new();
        for collector in self.registry.all() {
            let (collector, client, semaphore, tx) = (
                Arc::clone(collector),
                client.clone(),
                Arc::clone(&semaphore),
                tx.clone(),
            );
            tasks.spawn(async move { run_collector(collector, client, semaphore, tx).await });
        }
        drop(tx);

        let mut samples = Vec::new();
        while let Some(sample) = rx.recv().await {
            samples.push(sample);
        }

        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                tracing::error!(host = %target.host, error = %e, "Collector task failed");
            }
        }

        tracing::debug!(
            host = %target.host,
            samples = samples.len(),
            duration_ms = start.elapsed().as_millis(),
            "Scrape completed"
        );
        samples
    }
}

/// Run a single collector and forward its samples to the merge channel.
async fn run_collector(
    collector: Arc<dyn Collector>,
    client: ApiClient,
    semaphore: Arc<Semaphore>,
    tx: mpsc::Sender<Sample>,
) {
    let name = collector.name();
    let host = &client.target().host;

    if !client.target().allows(name) {
        tracing::debug!(collector = %name, host = %host, "Skipping collector for target");
        return;
    }

    let samples = {
        let Ok(_permit) = semaphore.acquire().await else {
            return;
        };

        let start = Instant::now();
        tracing::debug!(collector = %name, host = %host, "Running collection");
        match collector.collect(&client).await {
            Ok(samples) => {
                tracing::debug!(
                    collector = %name,
                    host = %host,
                    samples = samples.len(),
                    duration_ms = start.elapsed().as_millis(),
                    "Collection succeeded"
                );
                samples
            }
            Err(e) => {
                tracing::error!(collector = %name, host = %host, error = %e, "Collection failed");
                Vec::new()
            }
        }
    };

    for sample in samples {
        if tx.send(sample).await.is_err() {
            break;
        }
    }
}
