//! Immutable in-memory point dataset with spatial range queries.
//!
//! - [`PointStore`]: columnar point table plus its index, built once.
//! - [`index`]: grid, R-tree and linear-scan query engines.
//! - [`loader`]: CSV dataset loading.

pub mod index;
pub mod loader;
pub mod store;

pub use index::{IndexConfig, IndexKind, SpatialIndex};
pub use loader::load_csv;
pub use store::{Point, PointColumns, PointStore};
