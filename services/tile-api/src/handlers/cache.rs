//! Tile cache management handlers.

use axum::{extract::Extension, Json};
use serde_json::json;
use std::sync::Arc;
use storage::TileCacheStats;
use tracing::{info, instrument};

use crate::state::AppState;

/// GET /api/cache/stats - tile cache counters and occupancy
#[instrument(skip(state))]
pub async fn cache_stats_handler(Extension(state): Extension<Arc<AppState>>) -> Json<TileCacheStats> {
    Json(state.cache.stats().await)
}

/// POST /api/cache/clear - drop every cached tile
#[instrument(skip(state))]
pub async fn cache_clear_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<serde_json::Value> {
    let cleared = state.cache.clear().await;
    info!(cleared = cleared, "Tile cache cleared via API");
    Json(json!({ "cleared": cleared }))
}
