//! Dataset loading from CSV.
//!
//! The dataset is a CSV file whose header names an `X` and a `Y` column in
//! Web Mercator meters. Other columns are ignored.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use serde::Deserialize;
use tile_common::{TileError, TileResult};
use tracing::info;

use crate::store::{Point, PointColumns};

#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(rename = "X")]
    x: f64,
    #[serde(rename = "Y")]
    y: f64,
}

/// Load every point from the CSV file at `path`.
///
/// A missing file is reported as [`TileError::DatasetMissing`]; unreadable
/// rows as [`TileError::DatasetMalformed`] naming the offending line.
pub fn load_csv(path: impl AsRef<Path>) -> TileResult<PointColumns> {
    let path = path.as_ref();
    let start = Instant::now();

    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TileError::DatasetMissing(path.display().to_string()),
        _ => TileError::DatasetMalformed(format!("{}: {}", path.display(), e)),
    })?;

    let columns = read_csv(file)
        .map_err(|e| TileError::DatasetMalformed(format!("{}: {}", path.display(), e)))?;

    info!(
        path = %path.display(),
        points = columns.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Loaded dataset"
    );

    Ok(columns)
}

/// Parse CSV point records from any reader.
pub fn read_csv<R: Read>(reader: R) -> Result<PointColumns, String> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers().map_err(|e| e.to_string())?.clone();
    for required in ["X", "Y"] {
        if !headers.iter().any(|h| h == required) {
            return Err(format!("missing required column '{}'", required));
        }
    }

    let mut columns = PointColumns::default();
    for (row, record) in csv_reader.deserialize::<CsvRecord>().enumerate() {
        // Header is line 1.
        let record = record.map_err(|e| format!("line {}: {}", row + 2, e))?;
        columns.push(Point::new(record.x, record.y));
    }

    Ok(columns)
}
