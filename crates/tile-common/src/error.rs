//! Error types for the density tile services.

use thiserror::Error;

/// Result type alias using TileError.
pub type TileResult<T> = Result<T, TileError>;

/// Primary error type for tile operations.
#[derive(Debug, Clone, Error)]
pub enum TileError {
    // === Request Errors ===
    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Tile out of range: {0}")]
    TileOutOfRange(String),

    // === Dataset Errors ===
    #[error("Dataset not found at {0}")]
    DatasetMissing(String),

    #[error("Malformed dataset: {0}")]
    DatasetMalformed(String),

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    Render(String),

    // === Infrastructure Errors ===
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl TileError {
    /// Short stable label for the error kind, used as the `reason` label on
    /// error counters.
    pub fn code(&self) -> &'static str {
        match self {
            TileError::InvalidParameter { .. } => "invalid_parameter",
            TileError::TileOutOfRange(_) => "tile_out_of_range",
            TileError::DatasetMissing(_) => "dataset_missing",
            TileError::DatasetMalformed(_) => "dataset_malformed",
            TileError::Render(_) => "render_failed",
            TileError::Internal(_) => "internal",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            TileError::InvalidParameter { .. } | TileError::TileOutOfRange(_) => 400,
            _ => 500,
        }
    }
}
