//! Immutable columnar point table with an attached spatial index.

use std::time::Instant;

use tile_common::BoundingBox;
use tracing::{info, warn};

use crate::index::{IndexConfig, IndexKind, LinearScan, SpatialIndex};

/// A single point in Web Mercator meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Struct-of-arrays storage for point coordinates.
///
/// `xs[i]` and `ys[i]` always describe the same point.
#[derive(Debug, Clone, Default)]
pub struct PointColumns {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl PointColumns {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            xs: Vec::with_capacity(capacity),
            ys: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, point: Point) {
        self.xs.push(point.x);
        self.ys.push(point.y);
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize) -> Point {
        Point {
            x: self.xs[i],
            y: self.ys[i],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        self.xs
            .iter()
            .zip(self.ys.iter())
            .map(|(&x, &y)| Point { x, y })
    }

    /// Tight bounding box of all points, or None when empty.
    pub fn extent(&self) -> Option<BoundingBox> {
        if self.is_empty() {
            return None;
        }
        let mut bbox = BoundingBox::new(
            f64::INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
        );
        for p in self.iter() {
            bbox.min_x = bbox.min_x.min(p.x);
            bbox.min_y = bbox.min_y.min(p.y);
            bbox.max_x = bbox.max_x.max(p.x);
            bbox.max_y = bbox.max_y.max(p.y);
        }
        Some(bbox)
    }

    /// Approximate heap usage in bytes.
    pub fn memory_bytes(&self) -> usize {
        (self.xs.capacity() + self.ys.capacity()) * std::mem::size_of::<f64>()
    }
}

impl FromIterator<Point> for PointColumns {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut columns = PointColumns::with_capacity(iter.size_hint().0);
        for p in iter {
            columns.push(p);
        }
        columns
    }
}

/// The immutable point dataset shared by every request.
///
/// Built once at startup and never mutated afterwards, so it can be read
/// from any number of threads without locking. Point order carries no
/// meaning; the grid index reorders points into bucket order at build time.
pub struct PointStore {
    columns: PointColumns,
    index: Box<dyn SpatialIndex>,
    extent: Option<BoundingBox>,
    skipped: usize,
}

impl PointStore {
    /// Build a store from loaded points, dropping any with non-finite
    /// coordinates, and index it with the requested strategy.
    pub fn build(points: impl IntoIterator<Item = Point>, kind: IndexKind, config: &IndexConfig) -> Self {
        let start = Instant::now();

        let mut skipped = 0usize;
        let mut columns: PointColumns = points
            .into_iter()
            .filter(|p| {
                let keep = p.is_finite();
                if !keep {
                    skipped += 1;
                }
                keep
            })
            .collect();

        if skipped > 0 {
            warn!(skipped = skipped, "Dropped points with non-finite coordinates");
        }

        let extent = columns.extent();
        let index = kind.build(&mut columns, config);

        info!(
            points = columns.len(),
            index = index.name(),
            index_bytes = index.memory_bytes(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Point store ready"
        );

        Self {
            columns,
            index,
            extent,
            skipped,
        }
    }

    /// Number of points held.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of input points rejected at build time.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Tight bounding box of the stored points.
    pub fn extent(&self) -> Option<BoundingBox> {
        self.extent
    }

    /// Name of the active spatial index.
    pub fn index_name(&self) -> &'static str {
        self.index.name()
    }

    pub fn columns(&self) -> &PointColumns {
        &self.columns
    }

    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        self.columns.iter()
    }

    /// Approximate heap usage of the points and index in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.columns.memory_bytes() + self.index.memory_bytes()
    }

    /// Call `visit` for every point inside the closed box `bbox`.
    ///
    /// Boxes with a NaN bound or inverted bounds select nothing.
    pub fn visit_range(&self, bbox: &BoundingBox, visit: &mut dyn FnMut(Point)) {
        if !is_queryable(bbox) {
            return;
        }
        self.index.visit_range(&self.columns, bbox, visit);
    }

    /// All points inside the closed box `bbox`, via the spatial index.
    pub fn query_range(&self, bbox: &BoundingBox) -> Vec<Point> {
        let mut out = Vec::new();
        self.visit_range(bbox, &mut |p| out.push(p));
        out
    }

    /// All points inside `bbox` by brute force, bypassing the index.
    pub fn scan_range(&self, bbox: &BoundingBox) -> Vec<Point> {
        let mut out = Vec::new();
        if is_queryable(bbox) {
            LinearScan.visit_range(&self.columns, bbox, &mut |p| out.push(p));
        }
        out
    }

    /// Number of points inside `bbox`.
    pub fn count_range(&self, bbox: &BoundingBox) -> usize {
        let mut count = 0usize;
        self.visit_range(bbox, &mut |_| count += 1);
        count
    }
}

impl std::fmt::Debug for PointStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointStore")
            .field("points", &self.len())
            .field("index", &self.index.name())
            .field("extent", &self.extent)
            .finish()
    }
}

/// True unless a bound is NaN or the box is inverted. Infinite bounds are
/// allowed and simply cover everything on that side.
fn is_queryable(bbox: &BoundingBox) -> bool {
    bbox.min_x <= bbox.max_x && bbox.min_y <= bbox.max_y
}
