//! Binning of points into a fixed-size count grid.
//!
//! Column `i` covers `[min_x + i·w/W, min_x + (i+1)·w/W)`; row 0 is the top
//! of the box (`max_y`). Points exactly on the right or bottom edge are
//! clamped into the last column/row, so every point of the closed box lands
//! in some cell.

use point_store::{Point, PointStore};
use tile_common::BoundingBox;

/// Per-cell point counts for one tile, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DensityGrid {
    width: usize,
    height: usize,
    counts: Vec<u32>,
    dropped: u64,
}

impl DensityGrid {
    /// An all-zero grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            counts: vec![0; width * height],
            dropped: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major counts, `width * height` long.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Count at column `i`, row `j`.
    pub fn get(&self, i: usize, j: usize) -> Option<u32> {
        if i >= self.width || j >= self.height {
            return None;
        }
        self.counts.get(j * self.width + i).copied()
    }

    /// Sum of all counts, i.e. the number of points binned.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Points that were offered but fell outside the box or were not finite.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn max_count(&self) -> u32 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn nonzero_cells(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// True when no cell holds a point.
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }
}

/// Incremental binning into a [`DensityGrid`] for a fixed box.
///
/// Column `i = floor((x - min_x) / width · W)` and row
/// `j = floor((max_y - y) / height · H)`, both clamped to the grid. The
/// division happens before the multiplication so boundary points land in
/// the same cell as that formula evaluated directly.
struct Binner {
    grid: DensityGrid,
    bbox: BoundingBox,
    box_w: f64,
    box_h: f64,
    usable: bool,
}

impl Binner {
    fn new(bbox: &BoundingBox, width: usize, height: usize) -> Self {
        let usable = bbox.is_valid() && bbox.has_area() && width > 0 && height > 0;
        Self {
            grid: DensityGrid::new(width, height),
            bbox: *bbox,
            box_w: bbox.width(),
            box_h: bbox.height(),
            usable,
        }
    }

    #[inline]
    fn add(&mut self, p: Point) {
        if !self.usable || !p.is_finite() || !self.bbox.contains_point(p.x, p.y) {
            self.grid.dropped += 1;
            return;
        }

        let (cols, rows) = (self.grid.width, self.grid.height);
        let i = cell_index((p.x - self.bbox.min_x) / self.box_w * cols as f64, cols);
        let j = cell_index((self.bbox.max_y - p.y) / self.box_h * rows as f64, rows);
        let cell = &mut self.grid.counts[j * cols + i];
        *cell = cell.saturating_add(1);
    }
}

#[inline]
fn cell_index(offset: f64, cells: usize) -> usize {
    (offset.floor().max(0.0) as usize).min(cells - 1)
}

/// Bin `points` into a `width × height` grid over `bbox`.
///
/// A box with zero or non-finite extent yields an all-zero grid with every
/// point counted as dropped.
pub fn aggregate<I>(points: I, bbox: &BoundingBox, width: usize, height: usize) -> DensityGrid
where
    I: IntoIterator<Item = Point>,
{
    let mut binner = Binner::new(bbox, width, height);
    for p in points {
        binner.add(p);
    }
    binner.grid
}

/// Query `store` for `bbox` and bin the hits without collecting them first.
pub fn aggregate_store(store: &PointStore, bbox: &BoundingBox, width: usize, height: usize) -> DensityGrid {
    let mut binner = Binner::new(bbox, width, height);
    if binner.usable {
        store.visit_range(bbox, &mut |p| binner.add(p));
    }
    binner.grid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> BoundingBox {
        BoundingBox::new(0.0, 0.0, 4.0, 4.0)
    }

    #[test]
    fn test_row_zero_is_top() {
        let grid = aggregate([Point::new(0.5, 3.5)], &unit_box(), 4, 4);
        assert_eq!(grid.get(0, 0), Some(1));
        assert_eq!(grid.total(), 1);
    }

    #[test]
    fn test_closed_edges_are_clamped_in() {
        let corners = [
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(0.0, 4.0),
            Point::new(4.0, 4.0),
        ];
        let grid = aggregate(corners, &unit_box(), 4, 4);
        assert_eq!(grid.dropped(), 0);
        assert_eq!(grid.get(0, 3), Some(1));
        assert_eq!(grid.get(3, 3), Some(1));
        assert_eq!(grid.get(0, 0), Some(1));
        assert_eq!(grid.get(3, 0), Some(1));
    }

    #[test]
    fn test_outside_and_non_finite_are_dropped() {
        let points = [
            Point::new(2.0, 2.0),
            Point::new(-0.1, 2.0),
            Point::new(2.0, 4.1),
            Point::new(f64::NAN, 2.0),
            Point::new(2.0, f64::INFINITY),
        ];
        let grid = aggregate(points, &unit_box(), 4, 4);
        assert_eq!(grid.total(), 1);
        assert_eq!(grid.dropped(), 4);
    }

    #[test]
    fn test_degenerate_box_gives_empty_grid() {
        let flat = BoundingBox::new(0.0, 1.0, 4.0, 1.0);
        let grid = aggregate([Point::new(2.0, 1.0)], &flat, 4, 4);
        assert!(grid.is_empty());
        assert_eq!(grid.dropped(), 1);

        let nan = BoundingBox::new(0.0, f64::NAN, 4.0, 4.0);
        assert!(aggregate([Point::new(2.0, 2.0)], &nan, 4, 4).is_empty());
    }

    #[test]
    fn test_grid_statistics() {
        let points = [Point::new(0.5, 0.5), Point::new(0.6, 0.6), Point::new(3.5, 3.5)];
        let grid = aggregate(points, &unit_box(), 4, 4);
        assert_eq!(grid.max_count(), 2);
        assert_eq!(grid.nonzero_cells(), 2);
        assert_eq!(grid.counts().len(), 16);
        assert_eq!(grid.get(4, 0), None);
    }
}
