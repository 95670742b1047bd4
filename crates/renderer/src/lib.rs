//! Density tile rendering.
//!
//! The pipeline for one tile:
//! - [`aggregate`]: bin the points of a tile's bounding box into a count grid
//! - [`gradient`]: histogram-equalize the counts and shade them with a color ramp
//! - [`png`]: encode the RGBA buffer (indexed when the palette allows)

pub mod aggregate;
pub mod gradient;
pub mod png;

pub use aggregate::{aggregate, aggregate_store, DensityGrid};
pub use gradient::{colorize, equalize, Color, ColorRamp, EqualizedScale};
pub use png::{create_png, create_png_auto, create_png_indexed, PngError};
