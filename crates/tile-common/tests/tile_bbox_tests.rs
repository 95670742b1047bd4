//! Tests for tile coordinate to bounding box conversion.

use tile_common::tile::ORIGIN_SHIFT;
use tile_common::{lnglat_to_meters, tile_to_bbox, BoundingBox, TileCoord};
use test_utils::{assert_approx_eq, assert_bounds_approx_eq};

// ============================================================================
// Validity
// ============================================================================

#[test]
fn test_every_tile_up_to_zoom_8_has_positive_area() {
    for z in 0..=8u32 {
        let n = 1u32 << z;
        for x in 0..n {
            for y in 0..n {
                let bbox = tile_to_bbox(&TileCoord::new(z, x, y));
                assert!(
                    bbox.min_x < bbox.max_x && bbox.min_y < bbox.max_y,
                    "tile {}/{}/{} produced {:?}",
                    z,
                    x,
                    y,
                    bbox
                );
            }
        }
    }
}

#[test]
fn test_high_zoom_corner_tiles_have_positive_area() {
    for z in [12u32, 16, 20, 24, 28] {
        let last = (1u32 << z) - 1;
        for (x, y) in [(0, 0), (last, last), (last / 2, last / 2), (0, last), (last, 0)] {
            let bbox = tile_to_bbox(&TileCoord::new(z, x, y));
            assert!(bbox.has_area(), "tile {}/{}/{} produced {:?}", z, x, y, bbox);
        }
    }
}

// ============================================================================
// Geometry
// ============================================================================

#[test]
fn test_adjacent_tiles_share_edges() {
    let z = 6;
    let left = tile_to_bbox(&TileCoord::new(z, 20, 30));
    let right = tile_to_bbox(&TileCoord::new(z, 21, 30));
    let below = tile_to_bbox(&TileCoord::new(z, 20, 31));

    assert_approx_eq!(left.max_x, right.min_x, 1e-6);
    assert_approx_eq!(left.min_y, below.max_y, 1e-6);
}

#[test]
fn test_four_subtiles_cover_their_parent_exactly() {
    let (z, x, y) = (4, 3, 9);
    let parent = tile_to_bbox(&TileCoord::new(z, x, y));
    let union = [(0, 0), (1, 0), (0, 1), (1, 1)]
        .iter()
        .map(|&(dx, dy)| tile_to_bbox(&TileCoord::new(z + 1, 2 * x + dx, 2 * y + dy)))
        .reduce(|a, b| {
            BoundingBox::new(
                a.min_x.min(b.min_x),
                a.min_y.min(b.min_y),
                a.max_x.max(b.max_x),
                a.max_y.max(b.max_y),
            )
        })
        .unwrap();

    assert_bounds_approx_eq!(union, parent, 1e-6);
}

#[test]
fn test_point_lies_in_exactly_one_tile_of_its_neighbourhood() {
    let (px, py) = lnglat_to_meters(-74.0060, 40.7128);
    let mut hits = Vec::new();
    for x in 1203..=1208 {
        for y in 1537..=1543 {
            let coord = TileCoord::new(12, x, y);
            if tile_to_bbox(&coord).contains_point(px, py) {
                hits.push(coord);
            }
        }
    }
    assert_eq!(hits.len(), 1, "({}, {}) matched {:?}", px, py, hits);
}

#[test]
fn test_zoom_one_quadrants() {
    let nw = tile_to_bbox(&TileCoord::new(1, 0, 0));
    assert_bounds_approx_eq!(nw, BoundingBox::new(-ORIGIN_SHIFT, 0.0, 0.0, ORIGIN_SHIFT), 1e-2);
}

// ============================================================================
// Out-of-range coordinates
// ============================================================================

#[test]
fn test_out_of_range_tiles_do_not_produce_nan() {
    let coords = [
        TileCoord::new(0, 1, 1),
        TileCoord::new(3, 8, 9),
        TileCoord::new(10, u32::MAX, u32::MAX),
        TileCoord::new(u32::MAX, 0, 0),
        TileCoord::new(2000, 5, 5),
    ];

    for coord in coords {
        let bbox = tile_to_bbox(&coord);
        assert!(bbox.is_valid(), "{} produced {:?}", coord, bbox);
    }
}

#[test]
fn test_rows_below_the_world_collapse_to_zero_height() {
    let bbox = tile_to_bbox(&TileCoord::new(2, 1, 4));
    assert_eq!(bbox.height(), 0.0);
    assert!(!bbox.has_area());
}

#[test]
fn test_columns_past_the_world_collapse_to_zero_width() {
    let bbox = tile_to_bbox(&TileCoord::new(3, 8, 2));
    assert_eq!(bbox.width(), 0.0);
    assert_approx_eq!(bbox.max_x, ORIGIN_SHIFT, 1e-6);
}

#[test]
fn test_latlon_bounds_of_world_tile() {
    let bounds = tile_common::tile::tile_to_latlon_bounds(&TileCoord::new(0, 0, 0));
    assert_bounds_approx_eq!(bounds, BoundingBox::new(-180.0, -85.051_128_78, 180.0, 85.051_128_78), 1e-6);
}
