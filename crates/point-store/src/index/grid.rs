//! Uniform bucket grid index.
//!
//! The data extent is divided into `cols × rows` equal buckets sized so each
//! holds about `bucket_size` points on average. At build time the point
//! columns are counting-sorted into bucket order, so every bucket is one
//! contiguous run described by `offsets` (CSR layout). A query walks only the
//! buckets overlapping the box: buckets strictly inside the covered range
//! are copied without per-point tests, edge buckets are filtered.
//!
//! Bucket assignment is monotone in each coordinate, which is what makes
//! skipping the test for interior buckets exact: a point in a column strictly
//! between the query's first and last column cannot lie outside the query's
//! x-range.

use tile_common::BoundingBox;
use tracing::debug;

use super::SpatialIndex;
use crate::store::{Point, PointColumns};

/// Upper bound on buckets along either axis.
const MAX_BUCKETS_PER_AXIS: usize = 4096;

/// Bucket grid over a bucket-sorted [`PointColumns`].
pub struct GridIndex {
    extent: BoundingBox,
    cols: usize,
    rows: usize,
    cell_w: f64,
    cell_h: f64,
    /// `offsets[b]..offsets[b + 1]` is the run of bucket `b = row * cols + col`.
    offsets: Vec<usize>,
}

impl GridIndex {
    /// Build the grid and reorder `columns` into bucket order.
    pub fn build(columns: &mut PointColumns, bucket_size: usize) -> Self {
        let n = columns.len();
        let extent = columns
            .extent()
            .unwrap_or_else(|| BoundingBox::new(0.0, 0.0, 0.0, 0.0));

        let (cols, rows) = grid_dimensions(n, bucket_size.max(1), &extent);
        let cell_w = extent.width() / cols as f64;
        let cell_h = extent.height() / rows as f64;

        let mut index = Self {
            extent,
            cols,
            rows,
            cell_w,
            cell_h,
            offsets: Vec::new(),
        };

        // Counting sort: histogram, prefix sum, scatter.
        let buckets = cols * rows;
        let mut counts = vec![0usize; buckets + 1];
        let assignment: Vec<usize> = columns
            .iter()
            .map(|p| index.bucket_of(p.x, p.y))
            .collect();
        for &b in &assignment {
            counts[b + 1] += 1;
        }
        for b in 0..buckets {
            counts[b + 1] += counts[b];
        }

        let mut cursor = counts.clone();
        let mut xs = vec![0.0f64; n];
        let mut ys = vec![0.0f64; n];
        for (i, &b) in assignment.iter().enumerate() {
            let slot = cursor[b];
            xs[slot] = columns.xs[i];
            ys[slot] = columns.ys[i];
            cursor[b] += 1;
        }
        columns.xs = xs;
        columns.ys = ys;
        index.offsets = counts;

        debug!(
            cols = cols,
            rows = rows,
            points = n,
            max_bucket = index.max_bucket_len(),
            "Built grid index"
        );

        index
    }

    /// Bucket grid dimensions (columns, rows).
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Size of the fullest bucket.
    pub fn max_bucket_len(&self) -> usize {
        self.offsets
            .windows(2)
            .map(|w| w[1] - w[0])
            .max()
            .unwrap_or(0)
    }

    #[inline]
    fn col_of(&self, x: f64) -> usize {
        axis_cell(x, self.extent.min_x, self.cell_w, self.cols)
    }

    #[inline]
    fn row_of(&self, y: f64) -> usize {
        axis_cell(y, self.extent.min_y, self.cell_h, self.rows)
    }

    #[inline]
    fn bucket_of(&self, x: f64, y: f64) -> usize {
        self.row_of(y) * self.cols + self.col_of(x)
    }
}

impl SpatialIndex for GridIndex {
    fn name(&self) -> &'static str {
        "grid"
    }

    fn visit_range(&self, columns: &PointColumns, bbox: &BoundingBox, visit: &mut dyn FnMut(Point)) {
        if columns.is_empty() || !self.extent.intersects(bbox) {
            return;
        }

        let c0 = self.col_of(bbox.min_x);
        let c1 = self.col_of(bbox.max_x);
        let r0 = self.row_of(bbox.min_y);
        let r1 = self.row_of(bbox.max_y);

        for r in r0..=r1 {
            let row_base = r * self.cols;
            let interior_row = r > r0 && r < r1;

            if interior_row && c1 > c0 + 1 {
                // Edge columns filtered, the span between them taken whole.
                self.visit_filtered(columns, bbox, row_base + c0, row_base + c0 + 1, visit);
                let start = self.offsets[row_base + c0 + 1];
                let end = self.offsets[row_base + c1];
                for i in start..end {
                    visit(columns.get(i));
                }
                self.visit_filtered(columns, bbox, row_base + c1, row_base + c1 + 1, visit);
            } else {
                self.visit_filtered(columns, bbox, row_base + c0, row_base + c1 + 1, visit);
            }
        }
    }

    fn memory_bytes(&self) -> usize {
        self.offsets.capacity() * std::mem::size_of::<usize>()
    }
}

impl GridIndex {
    /// Test each point of buckets `first..last` (contiguous in storage).
    #[inline]
    fn visit_filtered(
        &self,
        columns: &PointColumns,
        bbox: &BoundingBox,
        first: usize,
        last: usize,
        visit: &mut dyn FnMut(Point),
    ) {
        let start = self.offsets[first];
        let end = self.offsets[last];
        for i in start..end {
            let p = columns.get(i);
            if bbox.contains_point(p.x, p.y) {
                visit(p);
            }
        }
    }
}

/// Cell index of `v` along one axis, clamped to `[0, cells - 1]`.
///
/// Monotone non-decreasing in `v`, including for infinite inputs.
#[inline]
fn axis_cell(v: f64, origin: f64, cell: f64, cells: usize) -> usize {
    if cells <= 1 || cell <= 0.0 {
        return 0;
    }
    let idx = ((v - origin) / cell).floor();
    idx.clamp(0.0, (cells - 1) as f64) as usize
}

/// Choose bucket counts so the average bucket holds `bucket_size` points and
/// buckets are roughly square in data units.
fn grid_dimensions(n: usize, bucket_size: usize, extent: &BoundingBox) -> (usize, usize) {
    let target = n.div_ceil(bucket_size).max(1) as f64;
    let (w, h) = (extent.width(), extent.height());

    let (cols, rows) = if w > 0.0 && h > 0.0 {
        let cols = (target * w / h).sqrt().ceil().max(1.0);
        let rows = (target / cols).ceil().max(1.0);
        (cols, rows)
    } else if w > 0.0 {
        (target, 1.0)
    } else if h > 0.0 {
        (1.0, target)
    } else {
        (1.0, 1.0)
    };

    (
        (cols as usize).clamp(1, MAX_BUCKETS_PER_AXIS),
        (rows as usize).clamp(1, MAX_BUCKETS_PER_AXIS),
    )
}
