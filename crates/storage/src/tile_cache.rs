//! Single-flight cache for rendered tiles.
//!
//! Finished tiles live in an LRU map keyed by [`TileCoord`]. A miss registers
//! the key as in flight and spawns the render; requests for the same key that
//! arrive meanwhile subscribe to a broadcast channel instead of rendering
//! again. Lookup and registration happen under one lock, so at most one render
//! per key runs at a time.
//!
//! ## Cancellation
//!
//! The render runs in its own task on the blocking pool. A requester that goes
//! away (client disconnect, handler timeout) only drops its receiver; the
//! render still finishes and populates the cache.
//!
//! ## Failures
//!
//! A failed render is delivered to every waiter but never cached, so the next
//! request for that key renders again.
//!
//! ## Memory bound
//!
//! With `max_bytes` set, least recently used tiles are evicted before an insert
//! would exceed the bound. A tile larger than the whole bound is returned but
//! not cached.

use bytes::Bytes;
use lru::LruCache;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tile_common::{TileCoord, TileError};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

type RenderOutcome = Result<Bytes, TileError>;

/// How a tile request was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from the cache.
    Hit,
    /// Waited on a render started by another request.
    Coalesced,
    /// This request started the render.
    Rendered,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Coalesced => "coalesced",
            CacheStatus::Rendered => "rendered",
        }
    }
}

/// Point-in-time view of the cache counters, served as JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TileCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub coalesced: u64,
    pub renders: u64,
    pub render_failures: u64,
    pub evictions: u64,
    pub entries: u64,
    pub bytes: u64,
    pub max_bytes: Option<u64>,
    /// Hits as a percentage of all lookups.
    pub hit_rate: f64,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    renders: AtomicU64,
    render_failures: AtomicU64,
    evictions: AtomicU64,
}

struct CacheState {
    ready: LruCache<TileCoord, Bytes>,
    bytes: u64,
    in_flight: HashMap<TileCoord, broadcast::Sender<RenderOutcome>>,
}

struct Inner {
    state: Mutex<CacheState>,
    counters: Counters,
    max_bytes: Option<u64>,
}

/// Shared handle to the tile cache. Cloning is cheap.
#[derive(Clone)]
pub struct TileCache {
    inner: Arc<Inner>,
}

impl TileCache {
    /// Create a cache. `None` leaves it unbounded.
    pub fn new(max_bytes: Option<u64>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(CacheState {
                    ready: LruCache::unbounded(),
                    bytes: 0,
                    in_flight: HashMap::new(),
                }),
                counters: Counters::default(),
                max_bytes,
            }),
        }
    }

    /// Create a cache bounded to `max_mb` megabytes. 0, or a bound too large
    /// to express in bytes, means unbounded.
    pub fn with_max_mb(max_mb: u64) -> Self {
        Self::new(max_mb.checked_mul(1024 * 1024).filter(|&bytes| bytes > 0))
    }

    /// Return the cached tile for `coord`, or render it with `render`.
    pub async fn get_or_render<F>(&self, coord: TileCoord, render: F) -> Result<Bytes, TileError>
    where
        F: FnOnce() -> Result<Bytes, TileError> + Send + 'static,
    {
        self.get_or_render_with_status(coord, render)
            .await
            .map(|(tile, _)| tile)
    }

    /// Like [`get_or_render`](Self::get_or_render), also reporting how the
    /// request was satisfied.
    pub async fn get_or_render_with_status<F>(
        &self,
        coord: TileCoord,
        render: F,
    ) -> Result<(Bytes, CacheStatus), TileError>
    where
        F: FnOnce() -> Result<Bytes, TileError> + Send + 'static,
    {
        let counters = &self.inner.counters;

        let (mut rx, status) = {
            let mut state = self.inner.state.lock().await;

            if let Some(tile) = state.ready.get(&coord) {
                counters.hits.fetch_add(1, Ordering::Relaxed);
                return Ok((tile.clone(), CacheStatus::Hit));
            }

            if let Some(tx) = state.in_flight.get(&coord) {
                counters.coalesced.fetch_add(1, Ordering::Relaxed);
                (tx.subscribe(), CacheStatus::Coalesced)
            } else {
                counters.misses.fetch_add(1, Ordering::Relaxed);
                // One message per channel, so capacity 1 never lags.
                let (tx, rx) = broadcast::channel(1);
                state.in_flight.insert(coord, tx.clone());

                let inner = Arc::clone(&self.inner);
                tokio::spawn(async move {
                    inner.run_render(coord, tx, render).await;
                });
                (rx, CacheStatus::Rendered)
            }
        };

        match rx.recv().await {
            Ok(outcome) => outcome.map(|tile| (tile, status)),
            Err(e) => Err(TileError::Internal(format!(
                "render of tile {} ended without a result: {}",
                coord, e
            ))),
        }
    }

    /// Cached tile for `coord` without rendering or touching the counters.
    pub async fn peek(&self, coord: &TileCoord) -> Option<Bytes> {
        self.inner.state.lock().await.ready.peek(coord).cloned()
    }

    /// Number of cached tiles.
    pub async fn len(&self) -> usize {
        self.inner.state.lock().await.ready.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every cached tile and return how many were removed.
    ///
    /// Renders already in flight are unaffected and will insert their result
    /// when they finish.
    pub async fn clear(&self) -> usize {
        let mut state = self.inner.state.lock().await;
        let removed = state.ready.len();
        state.ready.clear();
        state.bytes = 0;
        info!(removed = removed, "Tile cache cleared");
        removed
    }

    pub fn max_bytes(&self) -> Option<u64> {
        self.inner.max_bytes
    }

    /// Snapshot of the counters and current occupancy.
    pub async fn stats(&self) -> TileCacheStats {
        let (entries, bytes) = {
            let state = self.inner.state.lock().await;
            (state.ready.len() as u64, state.bytes)
        };
        let c = &self.inner.counters;
        let hits = c.hits.load(Ordering::Relaxed);
        let misses = c.misses.load(Ordering::Relaxed);
        let coalesced = c.coalesced.load(Ordering::Relaxed);
        let lookups = hits + misses + coalesced;

        TileCacheStats {
            hits,
            misses,
            coalesced,
            renders: c.renders.load(Ordering::Relaxed),
            render_failures: c.render_failures.load(Ordering::Relaxed),
            evictions: c.evictions.load(Ordering::Relaxed),
            entries,
            bytes,
            max_bytes: self.inner.max_bytes,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                hits as f64 / lookups as f64 * 100.0
            },
        }
    }
}

impl Inner {
    /// Run `render` on the blocking pool, publish the outcome to the cache and
    /// to every subscriber.
    async fn run_render<F>(&self, coord: TileCoord, tx: broadcast::Sender<RenderOutcome>, render: F)
    where
        F: FnOnce() -> Result<Bytes, TileError> + Send + 'static,
    {
        let start = Instant::now();
        let outcome = match tokio::task::spawn_blocking(render).await {
            Ok(outcome) => outcome,
            Err(e) => Err(TileError::Render(format!("render task failed: {}", e))),
        };
        self.counters.renders.fetch_add(1, Ordering::Relaxed);

        {
            let mut state = self.state.lock().await;
            state.in_flight.remove(&coord);
            match &outcome {
                Ok(tile) => self.insert_locked(&mut state, coord, tile.clone()),
                Err(e) => {
                    self.counters.render_failures.fetch_add(1, Ordering::Relaxed);
                    warn!(tile = %coord, error = %e, "Tile render failed, not caching");
                }
            }
        }

        debug!(
            tile = %coord,
            ok = outcome.is_ok(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Tile render finished"
        );

        // No receivers left is fine: the tile is cached regardless.
        let _ = tx.send(outcome);
    }

    fn insert_locked(&self, state: &mut CacheState, coord: TileCoord, tile: Bytes) {
        let size = tile.len() as u64;

        if let Some(max) = self.max_bytes {
            if size > max {
                debug!(tile = %coord, size = size, max_bytes = max, "Tile larger than cache bound, not caching");
                return;
            }
            let mut evicted = 0u64;
            while state.bytes + size > max {
                match state.ready.pop_lru() {
                    Some((_, old)) => {
                        state.bytes -= old.len() as u64;
                        evicted += 1;
                    }
                    None => break,
                }
            }
            if evicted > 0 {
                self.counters.evictions.fetch_add(evicted, Ordering::Relaxed);
                debug!(evicted = evicted, cache_bytes = state.bytes, "Evicted tiles");
            }
        }

        if let Some(old) = state.ready.put(coord, tile) {
            state.bytes -= old.len() as u64;
        }
        state.bytes += size;
    }
}
