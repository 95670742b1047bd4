//! Application metrics collection and reporting.

use metrics::{counter, gauge, histogram};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use storage::{CacheStatus, TileCacheStats};
use tile_common::TileError;

/// Metrics collector for the tile API.
///
/// Every event is counted locally (for `/api/metrics`) and forwarded to the
/// `metrics` recorder (for `/metrics`).
#[derive(Debug)]
pub struct MetricsCollector {
    pub tile_requests: AtomicU64,
    pub rejected_requests: AtomicU64,
    pub cache_hits: AtomicU64,
    pub coalesced: AtomicU64,
    pub renders: AtomicU64,
    pub render_errors: AtomicU64,
    render_time_us: AtomicU64,
    start_time: Instant,
}

/// JSON view of the collector.
#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub tile_requests: u64,
    pub rejected_requests: u64,
    pub cache_hits: u64,
    pub coalesced: u64,
    pub renders: u64,
    pub render_errors: u64,
    pub avg_render_ms: f64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            tile_requests: AtomicU64::new(0),
            rejected_requests: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            coalesced: AtomicU64::new(0),
            renders: AtomicU64::new(0),
            render_errors: AtomicU64::new(0),
            render_time_us: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_tile_request(&self) {
        self.tile_requests.fetch_add(1, Ordering::Relaxed);
        counter!("tile_requests_total").increment(1);
    }

    /// A request rejected before reaching the cache (bad coordinates).
    pub fn record_rejected(&self, err: &TileError) {
        self.rejected_requests.fetch_add(1, Ordering::Relaxed);
        counter!("tile_requests_rejected_total", "reason" => err.code()).increment(1);
    }

    pub fn record_cache_status(&self, status: CacheStatus) {
        match status {
            CacheStatus::Hit => {
                self.cache_hits.fetch_add(1, Ordering::Relaxed);
                counter!("tile_cache_hits_total").increment(1);
            }
            CacheStatus::Coalesced => {
                self.coalesced.fetch_add(1, Ordering::Relaxed);
                counter!("tile_cache_coalesced_total").increment(1);
            }
            CacheStatus::Rendered => {
                counter!("tile_cache_misses_total").increment(1);
            }
        }
    }

    /// Time spent in one render, recorded from the blocking pool.
    pub fn record_render(&self, elapsed: Duration) {
        self.renders.fetch_add(1, Ordering::Relaxed);
        self.render_time_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
        histogram!("tile_render_duration_seconds").record(elapsed.as_secs_f64());
    }

    pub fn record_render_error(&self, err: &TileError) {
        self.render_errors.fetch_add(1, Ordering::Relaxed);
        counter!("tile_render_errors_total", "reason" => err.code()).increment(1);
    }

    /// Publish cache occupancy as gauges, called before each scrape.
    pub fn record_cache_stats(&self, stats: &TileCacheStats) {
        gauge!("tile_cache_entries").set(stats.entries as f64);
        gauge!("tile_cache_size_bytes").set(stats.bytes as f64);
        gauge!("tile_cache_evictions").set(stats.evictions as f64);
        gauge!("tile_cache_hit_rate_percent").set(stats.hit_rate);
    }

    pub fn record_point_count(&self, points: usize) {
        gauge!("dataset_points").set(points as f64);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let renders = self.renders.load(Ordering::Relaxed);
        let render_us = self.render_time_us.load(Ordering::Relaxed);
        MetricsSnapshot {
            uptime_secs: self.uptime().as_secs(),
            tile_requests: self.tile_requests.load(Ordering::Relaxed),
            rejected_requests: self.rejected_requests.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            renders,
            render_errors: self.render_errors.load(Ordering::Relaxed),
            avg_render_ms: if renders == 0 {
                0.0
            } else {
                render_us as f64 / renders as f64 / 1000.0
            },
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
