//! `GET /tiles/{z}/{x}/{y}.png`

use axum::{
    extract::{Extension, Path},
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tile_common::{TileCoord, TileError, TileResult};
use tracing::{error, instrument};

use super::common::error_response;
use crate::rendering::render_tile;
use crate::state::AppState;

/// Serve one density tile, rendering it through the cache when needed.
#[instrument(skip_all, fields(z = %z, x = %x, y = %y))]
pub async fn tile_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((z, x, y)): Path<(String, String, String)>,
) -> Response {
    state.metrics.record_tile_request();

    let coord = match parse_tile_path(&z, &x, &y, state.config.max_zoom) {
        Ok(coord) => coord,
        Err(e) => {
            state.metrics.record_rejected(&e);
            return error_response(&e);
        }
    };

    let store = Arc::clone(&state.store);
    let ramp = Arc::clone(&state.ramp);
    let metrics = Arc::clone(&state.metrics);
    let result = state
        .cache
        .get_or_render_with_status(coord, move || {
            let start = Instant::now();
            let tile = render_tile(&store, &coord, &ramp);
            metrics.record_render(start.elapsed());
            tile
        })
        .await;

    match result {
        Ok((png, status)) => {
            state.metrics.record_cache_status(status);
            (
                [
                    (header::CONTENT_TYPE, "image/png".to_string()),
                    (
                        header::CACHE_CONTROL,
                        format!("public, max-age={}", state.config.max_age_secs),
                    ),
                ],
                png,
            )
                .into_response()
        }
        Err(e) => {
            state.metrics.record_render_error(&e);
            error!(tile = %coord, reason = e.code(), error = %e, "Tile request failed");
            error_response(&e)
        }
    }
}

/// Parse and validate the `z`, `x` and `y.png` path segments.
pub fn parse_tile_path(z: &str, x: &str, y_file: &str, max_zoom: u32) -> TileResult<TileCoord> {
    let y = y_file
        .strip_suffix(".png")
        .ok_or_else(|| invalid("y", format!("'{}' must end in .png", y_file)))?;

    let z: u32 = parse_number("zoom", z)?;
    let x: u32 = parse_number("x", x)?;
    let y: u32 = parse_number("y", y)?;

    if z > max_zoom {
        return Err(TileError::TileOutOfRange(format!(
            "zoom {} exceeds the maximum of {}",
            z, max_zoom
        )));
    }

    let coord = TileCoord::new(z, x, y);
    if !coord.is_valid() {
        return Err(TileError::TileOutOfRange(format!(
            "tile {} does not exist, x and y must be below 2^{}",
            coord, z
        )));
    }
    Ok(coord)
}

fn parse_number(param: &str, value: &str) -> TileResult<u32> {
    // u32's parser accepts a leading '+'; tile paths should not.
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(param, format!("'{}' is not a non-negative integer", value)));
    }
    value
        .parse()
        .map_err(|_| invalid(param, format!("'{}' is out of range", value)))
}

fn invalid(param: &str, message: String) -> TileError {
    TileError::InvalidParameter {
        param: param.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_path() {
        assert_eq!(
            parse_tile_path("3", "2", "5.png", 30).unwrap(),
            TileCoord::new(3, 2, 5)
        );
        assert_eq!(
            parse_tile_path("0", "0", "0.png", 30).unwrap(),
            TileCoord::new(0, 0, 0)
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for (z, x, y) in [
            ("a", "0", "0.png"),
            ("1", "-1", "0.png"),
            ("1", "0", "0.jpg"),
            ("1", "0", "0"),
            ("1", "0", ".png"),
            ("1", "+1", "0.png"),
            ("1", "0", "99999999999.png"),
        ] {
            let err = parse_tile_path(z, x, y, 30).unwrap_err();
            assert_eq!(err.http_status_code(), 400, "{}/{}/{}", z, x, y);
        }
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(matches!(
            parse_tile_path("2", "4", "0.png", 30),
            Err(TileError::TileOutOfRange(_))
        ));
        assert!(matches!(
            parse_tile_path("2", "0", "4.png", 30),
            Err(TileError::TileOutOfRange(_))
        ));
        assert!(matches!(
            parse_tile_path("31", "0", "0.png", 30),
            Err(TileError::TileOutOfRange(_))
        ));
        assert!(parse_tile_path("30", "1073741823", "1073741823.png", 30).is_ok());
    }
}
