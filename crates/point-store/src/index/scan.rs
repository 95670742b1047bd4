//! Brute-force reference query.

use tile_common::BoundingBox;

use super::SpatialIndex;
use crate::store::{Point, PointColumns};

/// Tests every point against the box. Correct by construction and used as
/// the oracle for the other indexes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearScan;

impl SpatialIndex for LinearScan {
    fn name(&self) -> &'static str {
        "scan"
    }

    fn visit_range(&self, columns: &PointColumns, bbox: &BoundingBox, visit: &mut dyn FnMut(Point)) {
        for p in columns.iter() {
            if bbox.contains_point(p.x, p.y) {
                visit(p);
            }
        }
    }

    fn memory_bytes(&self) -> usize {
        0
    }
}
