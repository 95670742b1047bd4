//! Slippy-map tile coordinates and their Web Mercator footprints.

use crate::BoundingBox;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Tile edge length in pixels.
pub const TILE_SIZE: usize = 256;

/// WGS84 semi-major axis used by the spherical Web Mercator projection.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Half the projected world width in meters (`π · R`).
pub const ORIGIN_SHIFT: f64 = PI * EARTH_RADIUS;

/// Latitude at which Web Mercator becomes square, `atan(sinh(π))` in degrees.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// A tile coordinate (z/x/y), top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x)
    pub x: u32,
    /// Row (y)
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Number of tiles along one axis at zoom `z`, or None when it does not
    /// fit in a u64.
    pub fn tiles_per_axis(z: u32) -> Option<u64> {
        1u64.checked_shl(z)
    }

    /// True when both x and y address a tile that exists at this zoom.
    pub fn is_valid(&self) -> bool {
        match Self::tiles_per_axis(self.z) {
            Some(n) => (self.x as u64) < n && (self.y as u64) < n,
            // Every u32 column exists once the matrix is wider than u64.
            None => true,
        }
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Longitude/latitude in degrees of the top-left corner of tile column
/// `x`, row `y` at zoom `z`.
///
/// Positions are clamped to the world edge `[0, 2^z]`, so every corner past
/// the edge lands on exactly the same coordinate.
fn tile_corner_lnglat(x: f64, y: f64, z: u32) -> (f64, f64) {
    let n = (z as f64).exp2();
    let x = x.clamp(0.0, n);
    let y = y.clamp(0.0, n);
    let lon = x / n * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * y / n)).sinh().atan().to_degrees();
    (lon, lat)
}

/// Project longitude/latitude in degrees to spherical Web Mercator meters.
///
/// Latitude is clamped to `±MAX_LATITUDE` first so the poles project to the
/// edge of the square world instead of infinity.
pub fn lnglat_to_meters(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = lon * ORIGIN_SHIFT / 180.0;
    let y = ((90.0 + lat) * PI / 360.0).tan().ln() * ORIGIN_SHIFT / PI;
    (x, y)
}

/// Web Mercator footprint of a tile in meters.
///
/// Total over every `u32` input: tiles beyond the edge of the world collapse
/// to a zero-width or zero-height box on that edge rather than producing NaN.
pub fn tile_to_bbox(coord: &TileCoord) -> BoundingBox {
    let (lon_left, lat_top) = tile_corner_lnglat(coord.x as f64, coord.y as f64, coord.z);
    let (lon_right, lat_bottom) =
        tile_corner_lnglat(coord.x as f64 + 1.0, coord.y as f64 + 1.0, coord.z);

    let top_left = lnglat_to_meters(lon_left, lat_top);
    let bottom_right = lnglat_to_meters(lon_right, lat_bottom);

    BoundingBox::from_corners(top_left, bottom_right)
}

/// Convert Web Mercator tile coordinates to lat/lon bounds in degrees.
pub fn tile_to_latlon_bounds(coord: &TileCoord) -> BoundingBox {
    let (lon_min, lat_max) = tile_corner_lnglat(coord.x as f64, coord.y as f64, coord.z);
    let (lon_max, lat_min) =
        tile_corner_lnglat(coord.x as f64 + 1.0, coord.y as f64 + 1.0, coord.z);

    BoundingBox::new(lon_min, lat_min, lon_max, lat_max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_zero_covers_world() {
        let bbox = tile_to_bbox(&TileCoord::new(0, 0, 0));
        assert!((bbox.min_x + ORIGIN_SHIFT).abs() < 1e-6);
        assert!((bbox.max_x - ORIGIN_SHIFT).abs() < 1e-6);
        assert!((bbox.min_y + ORIGIN_SHIFT).abs() < 1e-2);
        assert!((bbox.max_y - ORIGIN_SHIFT).abs() < 1e-2);
    }

    #[test]
    fn test_is_valid() {
        assert!(TileCoord::new(0, 0, 0).is_valid());
        assert!(!TileCoord::new(0, 1, 0).is_valid());
        assert!(TileCoord::new(3, 7, 7).is_valid());
        assert!(!TileCoord::new(3, 8, 0).is_valid());
        assert!(TileCoord::new(40, u32::MAX, u32::MAX).is_valid());
        assert!(TileCoord::new(70, u32::MAX, 0).is_valid());
    }

    #[test]
    fn test_meters_at_known_points() {
        let (x, y) = lnglat_to_meters(180.0, 0.0);
        assert!((x - ORIGIN_SHIFT).abs() < 1e-6);
        assert!(y.abs() < 1e-6);

        let (x, _) = lnglat_to_meters(-90.0, 45.0);
        assert!((x + ORIGIN_SHIFT / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_pole_latitudes_are_clamped() {
        let (_, north) = lnglat_to_meters(0.0, 90.0);
        let (_, south) = lnglat_to_meters(0.0, -90.0);
        assert!(north.is_finite());
        assert!(south.is_finite());
        assert!((north - ORIGIN_SHIFT).abs() < 1e-2);
        assert!((south + ORIGIN_SHIFT).abs() < 1e-2);
    }
}
