//! Spatial query engines over a [`PointColumns`] table.
//!
//! Three strategies share one contract: visit exactly the points inside a
//! closed bounding box. `LinearScan` is the reference, `GridIndex` is the
//! default, and `RTreeIndex` wraps `rstar`.

mod grid;
mod rtree;
mod scan;

pub use grid::GridIndex;
pub use rtree::RTreeIndex;
pub use scan::LinearScan;

use std::fmt;
use std::str::FromStr;

use tile_common::BoundingBox;

use crate::store::{Point, PointColumns};

/// Default number of points a grid bucket should hold on average.
pub const DEFAULT_BUCKET_SIZE: usize = 64;

/// A read-only spatial index built once over a point table.
///
/// Implementations must visit every point `p` with
/// `bbox.contains_point(p.x, p.y)` exactly once and nothing else. Callers
/// have already rejected boxes with NaN or inverted bounds.
pub trait SpatialIndex: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Visit every point of `columns` inside `bbox`.
    fn visit_range(&self, columns: &PointColumns, bbox: &BoundingBox, visit: &mut dyn FnMut(Point));

    /// Approximate heap usage of the index itself (excluding `columns`).
    fn memory_bytes(&self) -> usize;
}

/// Tuning knobs for index construction.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Target average points per grid bucket.
    pub bucket_size: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

/// Which spatial index a [`crate::PointStore`] uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexKind {
    /// Uniform bucket grid (default).
    #[default]
    Grid,
    /// `rstar` R-tree.
    RTree,
    /// No index; every query scans all points.
    Scan,
}

impl IndexKind {
    /// Build the index. The grid reorders `columns` in place.
    pub fn build(self, columns: &mut PointColumns, config: &IndexConfig) -> Box<dyn SpatialIndex> {
        match self {
            IndexKind::Grid => Box::new(GridIndex::build(columns, config.bucket_size)),
            IndexKind::RTree => Box::new(RTreeIndex::build(columns)),
            IndexKind::Scan => Box::new(LinearScan),
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IndexKind::Grid => "grid",
            IndexKind::RTree => "rtree",
            IndexKind::Scan => "scan",
        };
        f.write_str(s)
    }
}

impl FromStr for IndexKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grid" => Ok(IndexKind::Grid),
            "rtree" | "r-tree" => Ok(IndexKind::RTree),
            "scan" | "linear" => Ok(IndexKind::Scan),
            other => Err(format!(
                "unknown index '{}', expected one of: grid, rtree, scan",
                other
            )),
        }
    }
}
