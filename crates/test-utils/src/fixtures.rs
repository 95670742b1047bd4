//! Common test fixtures for density tile tests.

use std::io::Write;

use tempfile::NamedTempFile;

/// Half the Web Mercator world width in meters.
pub const WORLD_HALF_WIDTH: f64 = 20_037_508.342_789_244;

/// Common bounding boxes in Web Mercator meters, as
/// `(min_x, min_y, max_x, max_y)`.
pub mod bbox {
    use super::WORLD_HALF_WIDTH;

    /// The whole projected world.
    pub const WORLD: (f64, f64, f64, f64) =
        (-WORLD_HALF_WIDTH, -WORLD_HALF_WIDTH, WORLD_HALF_WIDTH, WORLD_HALF_WIDTH);

    /// Roughly New York City.
    pub const NYC: (f64, f64, f64, f64) = (-8_266_000.0, 4_935_000.0, -8_204_000.0, 5_000_000.0);

    /// A 1 km square around the projection origin.
    pub const ORIGIN_KM: (f64, f64, f64, f64) = (-500.0, -500.0, 500.0, 500.0);
}

/// Write points to a temporary CSV file with an `X,Y` header.
///
/// The file is deleted when the returned handle is dropped.
pub fn write_points_csv(points: &[(f64, f64)]) -> std::io::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "X,Y")?;
    for (x, y) in points {
        writeln!(file, "{},{}", x, y)?;
    }
    file.flush()?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_points_csv() {
        let file = write_points_csv(&[(1.0, 2.0), (3.5, -4.25)]).unwrap();
        let text = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(text, "X,Y\n1,2\n3.5,-4.25\n");
    }
}
