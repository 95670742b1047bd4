//! Density heatmap tile service library.
//!
//! This module exposes the router and internal modules for testing purposes.

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod rendering;
pub mod state;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use state::AppState;

/// Build the HTTP router.
pub fn app(state: Arc<AppState>, prometheus: PrometheusHandle) -> Router {
    let lib_dir = state.www_dir.join("lib");

    Router::new()
        // Web client
        .route("/", get(handlers::index_handler))
        .nest_service("/lib", ServeDir::new(lib_dir))
        // Tiles
        .route("/tiles/:z/:x/:y", get(handlers::tile_handler))
        // Health check
        .route("/health", get(handlers::health_handler))
        .route("/ready", get(handlers::ready_handler))
        // Metrics
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api/metrics", get(handlers::api_metrics_handler))
        // Cache management
        .route("/api/cache/stats", get(handlers::cache_stats_handler))
        .route("/api/cache/clear", post(handlers::cache_clear_handler))
        .layer(Extension(state))
        .layer(Extension(prometheus))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
