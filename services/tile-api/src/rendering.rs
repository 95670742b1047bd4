//! Tile render pipeline: range query, aggregation, shading, PNG encoding.

use bytes::Bytes;
use point_store::PointStore;
use renderer::{aggregate_store, colorize, create_png_auto, ColorRamp};
use tile_common::tile::tile_to_latlon_bounds;
use tile_common::{tile_to_bbox, TileCoord, TileResult, TILE_SIZE};
use tracing::debug;

/// Render the density tile for `coord`.
///
/// CPU-bound; call it from the blocking pool. Tiles outside the world or with
/// no points render fully transparent.
pub fn render_tile(store: &PointStore, coord: &TileCoord, ramp: &ColorRamp) -> TileResult<Bytes> {
    let bbox = tile_to_bbox(coord);
    let grid = aggregate_store(store, &bbox, TILE_SIZE, TILE_SIZE);
    let pixels = colorize(&grid, ramp);
    let png = create_png_auto(&pixels, TILE_SIZE, TILE_SIZE)?;

    debug!(
        tile = %coord,
        lnglat = ?tile_to_latlon_bounds(coord),
        points = grid.total(),
        cells = grid.nonzero_cells(),
        max_count = grid.max_count(),
        bytes = png.len(),
        "Rendered tile"
    );

    Ok(Bytes::from(png))
}
