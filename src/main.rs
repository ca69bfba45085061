//! pfSense Exporter Binary Entry Point
//!
//! Loads the configuration, builds the collector registry and serves scrapes
//! until interrupted. Core functionality lives in the `pfsense_exporter`
//! library crate.

use clap::Parser;
use pfsense_exporter::{
    collector::{CollectorRegistry, MasterCollector},
    config::{ExporterConfig, TargetResolver},
    server::{AppState, create_router},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Prometheus exporter for pfSense appliances
#[derive(Parser, Debug)]
#[command(name = "pfsense-exporter", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "config.yml",
        env = "PFSENSE_EXPORTER_CONFIG"
    )]
    config: String,

    /// Listen address (overrides config file)
    #[arg(long, env = "PFSENSE_EXPORTER_ADDRESS")]
    address: Option<String>,

    /// Listen port (overrides config file)
    #[arg(long, env = "PFSENSE_EXPORTER_PORT")]
    port: Option<u16>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "pfSense exporter starting");

    tracing::info!("Loading configuration from: {}", cli.config);
    let config = match ExporterConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(path = %cli.config, error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };

    // CLI > ENV > config file
    let config = match config.with_overrides(cli.address, cli.port) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid command-line override");
            return Err(e.into());
        }
    };

    let registry = Arc::new(CollectorRegistry::with_default_collectors());
    tracing::info!(
        collectors = ?registry.names(),
        targets = config.targets.len(),
        "Collector registry initialized"
    );

    for target in &config.targets {
        tracing::info!(
            host = %target.host,
            port = target.port,
            scheme = %target.scheme,
            auth = target.auth.method(),
            collectors = ?target.collectors,
            "Configured target"
        );
    }

    let app_state = AppState {
        resolver: Arc::new(TargetResolver::new(config.targets.clone())),
        master: Arc::new(MasterCollector::new(registry)),
    };

    let app = create_router(app_state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Listening on: http://{}", addr);
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Setup graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }
}
