//! Response helpers shared by the handlers.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tile_common::TileError;

/// Plain-text error response with the status the error maps to.
pub fn error_response(err: &TileError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        err.to_string(),
    )
        .into_response()
}
