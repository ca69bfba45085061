//! Web server module for the exporter.
//!
//! Serves `/metrics?target=<host>`, which scrapes one configured appliance
//! on demand, and a liveness check.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

use crate::client::ApiClient;
use crate::collector::MasterCollector;
use crate::config::TargetResolver;
use crate::exposition::{self, CONTENT_TYPE};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<TargetResolver>,
    pub master: Arc<MasterCollector>,
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

/// Query parameters for the scrape endpoint.
#[derive(Debug, Deserialize)]
pub struct ScrapeParams {
    pub target: Option<String>,
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    let app_state = Arc::new(state);

    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz_handler))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .with_state(app_state)
}

/// Liveness check.
async fn healthz_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Scrape one target and return its metrics in the text exposition format.
///
/// Collector failures never fail the scrape; they only shrink the output.
async fn metrics_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ScrapeParams>,
) -> Response {
    let Some(target) = params
        .target
        .as_deref()
        .and_then(|host| state.resolver.resolve(host))
    else {
        tracing::warn!(requested = ?params.target, "Scrape requested for unknown target");
        return (StatusCode::BAD_REQUEST, "Bad target").into_response();
    };

    let client = match ApiClient::new(target) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build API client");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error: {}", e),
            )
                .into_response();
        }
    };

    let samples = state.master.collect(&client).await;
    match exposition::encode(&state.master.describe(), &samples) {
        Ok(body) => ([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            tracing::error!(host = %client.target().host, error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e)).into_response()
        }
    }
}
