//! Axis-aligned boxes in projected coordinates.

use serde::{Deserialize, Serialize};

/// A projected bounding box in Web Mercator meters (EPSG:3857).
///
/// Containment is closed on both axes: a point lying exactly on an edge
/// belongs to the box, so points on a shared tile edge are drawn by both
/// neighbouring tiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Build the box spanned by two arbitrary corners.
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            min_x: a.0.min(b.0),
            min_y: a.1.min(b.1),
            max_x: a.0.max(b.0),
            max_y: a.1.max(b.1),
        }
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// True when all bounds are finite and min <= max on both axes.
    ///
    /// A box with zero width or height is still valid for containment tests
    /// but has no area to rasterize.
    pub fn is_valid(&self) -> bool {
        self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.max_x.is_finite()
            && self.max_y.is_finite()
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
    }

    /// True when the box has a strictly positive, finite area.
    pub fn has_area(&self) -> bool {
        self.is_valid() && self.width() > 0.0 && self.height() > 0.0
    }

    /// Whether the two closed boxes share at least one point.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Closed point containment, the boundary rule every spatial query uses.
    #[inline]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_orders_bounds() {
        let bbox = BoundingBox::from_corners((10.0, -5.0), (-10.0, 5.0));
        assert_eq!(bbox, BoundingBox::new(-10.0, -5.0, 10.0, 5.0));
    }

    #[test]
    fn test_containment_is_closed() {
        let bbox = BoundingBox::new(-1.0, -1.0, 1.0, 1.0);
        assert!(bbox.contains_point(1.0, -1.0));
        assert!(bbox.contains_point(-1.0, 1.0));
        assert!(!bbox.contains_point(1.0 + f64::EPSILON * 4.0, 0.0));
        assert!(!bbox.contains_point(f64::NAN, 0.0));
    }

    #[test]
    fn test_validity_and_area() {
        assert!(BoundingBox::new(0.0, 0.0, 1.0, 1.0).has_area());
        let line = BoundingBox::new(0.0, 2.0, 5.0, 2.0);
        assert!(line.is_valid());
        assert!(!line.has_area());
        assert!(!BoundingBox::new(1.0, 0.0, 0.0, 1.0).is_valid());
        assert!(!BoundingBox::new(0.0, 0.0, f64::INFINITY, 1.0).is_valid());
    }

    #[test]
    fn test_edge_touching_boxes_intersect() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(10.0, 0.0, 20.0, 10.0);
        assert!(a.intersects(&b));
    }
}
