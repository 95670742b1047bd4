//! Histogram-equalized color mapping for density grids.

use rayon::prelude::*;
use tile_common::{TileError, TileResult};
use tracing::debug;

use crate::aggregate::DensityGrid;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    /// Parse `#RRGGBB` (leading `#` optional) as an opaque color.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?, 255))
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Linear color interpolation, channels rounded to nearest.
fn interpolate_color(color1: Color, color2: Color, t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;

    Color::new(
        mix(color1.r, color2.r),
        mix(color1.g, color2.g),
        mix(color1.b, color2.b),
        mix(color1.a, color2.a),
    )
}

/// Piecewise-linear color ramp over `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    /// Stops sorted by position, positions within `[0, 1]`.
    stops: Vec<(f64, Color)>,
}

impl ColorRamp {
    /// Blue at 0, yellow at 0.5, red at 1.
    pub fn density() -> Self {
        Self {
            stops: vec![
                (0.0, Color::new(0, 0, 255, 255)),
                (0.5, Color::new(255, 255, 0, 255)),
                (1.0, Color::new(255, 0, 0, 255)),
            ],
        }
    }

    /// Build a ramp from explicit stops.
    pub fn new(mut stops: Vec<(f64, Color)>) -> TileResult<Self> {
        if stops.is_empty() {
            return Err(ramp_error("at least one stop is required"));
        }
        if stops.iter().any(|(pos, _)| !(0.0..=1.0).contains(pos)) {
            return Err(ramp_error("stop positions must lie in [0, 1]"));
        }
        stops.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(Self { stops })
    }

    /// Evenly spaced stops from `#RRGGBB` strings.
    pub fn from_hex(hexes: &[&str]) -> TileResult<Self> {
        let colors = hexes
            .iter()
            .map(|h| Color::from_hex(h).ok_or_else(|| ramp_error(&format!("invalid color '{}'", h))))
            .collect::<TileResult<Vec<_>>>()?;

        let last = colors.len().saturating_sub(1).max(1) as f64;
        let stops = colors
            .into_iter()
            .enumerate()
            .map(|(i, c)| (i as f64 / last, c))
            .collect();
        Self::new(stops)
    }

    pub fn stops(&self) -> &[(f64, Color)] {
        &self.stops
    }

    /// Color at position `t`; values outside `[0, 1]` (and NaN) are clamped.
    pub fn color_at(&self, t: f64) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let first = self.stops[0];
        if t <= first.0 {
            return first.1;
        }
        for pair in self.stops.windows(2) {
            let (t0, c0) = pair[0];
            let (t1, c1) = pair[1];
            if t <= t1 {
                let span = t1 - t0;
                let local = if span > 0.0 { (t - t0) / span } else { 1.0 };
                return interpolate_color(c0, c1, local);
            }
        }
        self.stops[self.stops.len() - 1].1
    }
}

impl Default for ColorRamp {
    fn default() -> Self {
        Self::density()
    }
}

fn ramp_error(message: &str) -> TileError {
    TileError::InvalidParameter {
        param: "ramp".to_string(),
        message: message.to_string(),
    }
}

/// Rank-based normalization of the nonzero counts of one grid.
///
/// With `N` nonzero cells, `cdf(v)` the number of them with count ≤ `v` and
/// `v_min` the smallest nonzero count, a count maps to
/// `(cdf(v) - cdf(v_min)) / (N - cdf(v_min))`. The smallest count maps to 0
/// and the largest to 1. When only one distinct nonzero count exists every
/// nonzero cell maps to 0.5.
#[derive(Debug, Clone, PartialEq)]
pub struct EqualizedScale {
    /// Distinct nonzero counts, ascending.
    values: Vec<u32>,
    /// Normalized level for each entry of `values`.
    levels: Vec<f64>,
}

impl EqualizedScale {
    /// Normalized level of `count`, or None for an empty cell.
    ///
    /// Counts absent from the grid take the level of the largest present
    /// count below them (0 if none).
    pub fn level(&self, count: u32) -> Option<f64> {
        if count == 0 {
            return None;
        }
        let idx = self.values.partition_point(|&v| v <= count);
        Some(if idx == 0 { 0.0 } else { self.levels[idx - 1] })
    }

    /// Number of distinct nonzero counts.
    pub fn distinct(&self) -> usize {
        self.values.len()
    }
}

/// Build the equalization table for a set of cell counts.
pub fn equalize(counts: &[u32]) -> EqualizedScale {
    let mut nonzero: Vec<u32> = counts.iter().copied().filter(|&c| c > 0).collect();
    nonzero.sort_unstable();
    let n = nonzero.len();

    // Distinct values with their cumulative counts.
    let mut values = Vec::new();
    let mut cdf = Vec::new();
    for (i, &v) in nonzero.iter().enumerate() {
        if i + 1 == n || nonzero[i + 1] != v {
            values.push(v);
            cdf.push(i + 1);
        }
    }

    let levels = if values.len() <= 1 {
        vec![0.5; values.len()]
    } else {
        let base = cdf[0];
        let span = (n - base) as f64;
        cdf.iter().map(|&c| (c - base) as f64 / span).collect()
    };

    EqualizedScale { values, levels }
}

/// Shade a density grid into RGBA pixels (4 bytes per cell, row-major).
///
/// Empty cells are fully transparent; every other cell is opaque and takes
/// the ramp color of its equalized level.
pub fn colorize(grid: &DensityGrid, ramp: &ColorRamp) -> Vec<u8> {
    let scale = equalize(grid.counts());
    let palette: Vec<[u8; 4]> = scale
        .levels
        .iter()
        .map(|&t| {
            let mut c = ramp.color_at(t);
            c.a = 255;
            c.to_array()
        })
        .collect();

    let mut pixels = vec![0u8; grid.counts().len() * 4];
    pixels
        .par_chunks_mut(4)
        .zip(grid.counts().par_iter())
        .for_each(|(px, &count)| {
            if count == 0 {
                return;
            }
            let idx = scale.values.partition_point(|&v| v <= count);
            if idx > 0 {
                px.copy_from_slice(&palette[idx - 1]);
            }
        });

    debug!(
        width = grid.width(),
        height = grid.height(),
        levels = scale.distinct(),
        "Colorized density grid"
    );

    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        assert_eq!(Color::from_hex("#0000FF"), Some(Color::new(0, 0, 255, 255)));
        assert_eq!(Color::from_hex("ffff00"), Some(Color::new(255, 255, 0, 255)));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#GG0000"), None);
    }

    #[test]
    fn test_density_ramp_stops() {
        let ramp = ColorRamp::density();
        assert_eq!(ramp.color_at(0.0), Color::new(0, 0, 255, 255));
        assert_eq!(ramp.color_at(0.5), Color::new(255, 255, 0, 255));
        assert_eq!(ramp.color_at(1.0), Color::new(255, 0, 0, 255));
    }

    #[test]
    fn test_ramp_rounds_to_nearest() {
        let ramp = ColorRamp::density();
        // Halfway between blue and yellow.
        assert_eq!(ramp.color_at(0.25), Color::new(128, 128, 128, 255));
        // Halfway between yellow and red.
        assert_eq!(ramp.color_at(0.75), Color::new(255, 128, 0, 255));
    }

    #[test]
    fn test_ramp_clamps() {
        let ramp = ColorRamp::density();
        assert_eq!(ramp.color_at(-3.0), ramp.color_at(0.0));
        assert_eq!(ramp.color_at(7.0), ramp.color_at(1.0));
        assert_eq!(ramp.color_at(f64::NAN), ramp.color_at(0.0));
    }

    #[test]
    fn test_ramp_from_hex_matches_default() {
        let ramp = ColorRamp::from_hex(&["#0000FF", "#FFFF00", "#FF0000"]).unwrap();
        assert_eq!(ramp, ColorRamp::density());
        assert!(ColorRamp::from_hex(&[]).is_err());
        assert!(ColorRamp::from_hex(&["#nothex"]).is_err());
    }

    #[test]
    fn test_single_stop_ramp() {
        let ramp = ColorRamp::from_hex(&["#00FF00"]).unwrap();
        assert_eq!(ramp.color_at(0.3), Color::new(0, 255, 0, 255));
    }

    #[test]
    fn test_equalize_levels() {
        // Nonzero counts: 1,1,2,5 -> N = 4, cdf(1) = 2
        let scale = equalize(&[0, 1, 1, 2, 5, 0]);
        assert_eq!(scale.distinct(), 3);
        assert_eq!(scale.level(0), None);
        assert_eq!(scale.level(1), Some(0.0));
        assert_eq!(scale.level(2), Some(0.5));
        assert_eq!(scale.level(5), Some(1.0));
    }

    #[test]
    fn test_equalize_single_value_is_midpoint() {
        let scale = equalize(&[0, 3, 3, 0]);
        assert_eq!(scale.level(3), Some(0.5));
    }

    #[test]
    fn test_equalize_is_rank_based() {
        // Magnitudes do not matter, only order.
        let a = equalize(&[1, 2, 3, 4]);
        let b = equalize(&[1, 10, 1000, 100000]);
        assert_eq!(a.level(2), b.level(10));
        assert_eq!(a.level(3), b.level(1000));
    }
}
