//! In-process storage for rendered density tiles.
//!
//! Provides:
//! - A single-flight tile cache that renders each tile at most once at a
//!   time and shares the result with every concurrent requester

pub mod tile_cache;

pub use tile_cache::{CacheStatus, TileCache, TileCacheStats};
