//! The map page. Static assets under `/lib` are served by `ServeDir`.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;

use crate::state::AppState;

/// GET / - the web client's index.html
pub async fn index_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    match &state.index_html {
        Some(html) => Html(html.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "index.html not found").into_response(),
    }
}
