//! R-tree backed query via `rstar`.

use rstar::{RTree, AABB};
use tile_common::BoundingBox;

use super::SpatialIndex;
use crate::store::{Point, PointColumns};

/// Bulk-loaded R-tree over the point coordinates.
pub struct RTreeIndex {
    tree: RTree<[f64; 2]>,
}

impl RTreeIndex {
    pub fn build(columns: &PointColumns) -> Self {
        let points: Vec<[f64; 2]> = columns.iter().map(|p| [p.x, p.y]).collect();
        Self {
            tree: RTree::bulk_load(points),
        }
    }
}

impl SpatialIndex for RTreeIndex {
    fn name(&self) -> &'static str {
        "rtree"
    }

    fn visit_range(&self, _columns: &PointColumns, bbox: &BoundingBox, visit: &mut dyn FnMut(Point)) {
        // `locate_in_envelope` uses inclusive bounds, matching contains_point.
        let envelope = AABB::from_corners([bbox.min_x, bbox.min_y], [bbox.max_x, bbox.max_y]);
        for p in self.tree.locate_in_envelope(&envelope) {
            visit(Point { x: p[0], y: p[1] });
        }
    }

    fn memory_bytes(&self) -> usize {
        // Leaf payloads dominate; inner nodes add roughly a sixth on top.
        self.tree.size() * std::mem::size_of::<[f64; 2]>() * 7 / 6
    }
}
