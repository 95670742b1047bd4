//! Health checks, metrics, and monitoring endpoints.

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::Arc;
use tracing::instrument;

use crate::state::AppState;

/// GET /health - Basic health check
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /ready - the dataset is loaded before the listener binds, so a
/// running server is ready
pub async fn ready_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        format!("Ready: {} points ({} index)", state.store.len(), state.store.index_name()),
    )
}

/// GET /metrics - Prometheus metrics endpoint
#[instrument(skip(state, handle))]
pub async fn metrics_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(handle): Extension<PrometheusHandle>,
) -> Response {
    state.metrics.record_cache_stats(&state.cache.stats().await);

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
        .into_response()
}

/// GET /api/metrics - JSON metrics for the web UI
#[instrument(skip(state))]
pub async fn api_metrics_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<serde_json::Value> {
    let cache = state.cache.stats().await;

    Json(json!({
        "requests": state.metrics.snapshot(),
        "cache": cache,
        "dataset": {
            "points": state.store.len(),
            "skipped": state.store.skipped(),
            "index": state.store.index_name(),
            "memory_mb": state.store.memory_bytes() as f64 / 1024.0 / 1024.0,
        },
    }))
}
