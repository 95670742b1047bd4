//! HTTP request handlers.
//!
//! - `tiles`: the density tile endpoint
//! - `web`: the map page
//! - `metrics`: health checks and Prometheus metrics
//! - `cache`: tile cache inspection and clearing
//! - `common`: shared response helpers

pub mod cache;
pub mod common;
pub mod metrics;
pub mod tiles;
pub mod web;

pub use cache::{cache_clear_handler, cache_stats_handler};
pub use common::error_response;
pub use metrics::{api_metrics_handler, health_handler, metrics_handler, ready_handler};
pub use tiles::{parse_tile_path, tile_handler};
pub use web::index_handler;
