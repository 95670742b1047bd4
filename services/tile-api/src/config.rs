//! Command-line and environment configuration.

use clap::{Parser, ValueEnum};
use point_store::IndexKind;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "tile-api")]
#[command(about = "Density heatmap tile server")]
pub struct Args {
    /// Listen address
    #[arg(short, long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen: String,

    /// CSV dataset with X and Y columns in Web Mercator meters
    #[arg(long, env = "DATA_PATH", default_value = "data/stored.csv")]
    pub data: PathBuf,

    /// Directory holding index.html and the lib/ assets
    #[arg(long, env = "WWW_DIR", default_value = "./www")]
    pub www_dir: PathBuf,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Number of tokio worker threads (default: number of CPU cores)
    #[arg(long, env = "TOKIO_WORKER_THREADS")]
    pub worker_threads: Option<usize>,

    /// Spatial index: grid, rtree or scan
    #[arg(long, env = "SPATIAL_INDEX", default_value = "grid")]
    pub index: IndexKind,

    /// Target points per grid index bucket
    #[arg(long, env = "INDEX_BUCKET_SIZE", default_value_t = 64)]
    pub bucket_size: usize,

    /// Tile cache bound in megabytes, 0 for unbounded
    #[arg(long, env = "TILE_CACHE_MAX_MB", default_value_t = 0)]
    pub cache_max_mb: u64,

    /// Highest zoom level served
    #[arg(long, env = "MAX_ZOOM", default_value_t = 30)]
    pub max_zoom: u32,

    /// Cache-Control max-age for tile responses, in seconds
    #[arg(long, env = "TILE_MAX_AGE", default_value_t = 3600)]
    pub tile_max_age: u64,

    /// Comma-separated `#RRGGBB` ramp stops, low to high density
    #[arg(long, env = "COLOR_RAMP")]
    pub ramp: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Settings the request handlers need.
#[derive(Debug, Clone)]
pub struct TileConfig {
    pub max_zoom: u32,
    pub max_age_secs: u64,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            max_zoom: 30,
            max_age_secs: 3600,
        }
    }
}

impl From<&Args> for TileConfig {
    fn from(args: &Args) -> Self {
        Self {
            max_zoom: args.max_zoom,
            max_age_secs: args.tile_max_age,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["tile-api"]);
        assert_eq!(args.listen, "0.0.0.0:8080");
        assert_eq!(args.data, PathBuf::from("data/stored.csv"));
        assert_eq!(args.index, IndexKind::Grid);
        assert_eq!(args.log_format, LogFormat::Text);
        assert_eq!(args.max_zoom, 30);
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "tile-api",
            "--index",
            "rtree",
            "--log-format",
            "json",
            "--cache-max-mb",
            "256",
            "--ramp",
            "#000000,#FFFFFF",
        ]);
        assert_eq!(args.index, IndexKind::RTree);
        assert_eq!(args.log_format, LogFormat::Json);
        assert_eq!(args.cache_max_mb, 256);
        assert_eq!(args.ramp.as_deref(), Some("#000000,#FFFFFF"));
    }

    #[test]
    fn test_unknown_index_is_rejected() {
        assert!(Args::try_parse_from(["tile-api", "--index", "quadtree"]).is_err());
    }
}
