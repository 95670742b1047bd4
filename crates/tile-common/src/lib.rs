//! Common types and utilities shared across the density tile services.

pub mod bbox;
pub mod error;
pub mod tile;

pub use bbox::BoundingBox;
pub use error::{TileError, TileResult};
pub use tile::{lnglat_to_meters, tile_to_bbox, TileCoord, TILE_SIZE};
