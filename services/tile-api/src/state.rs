//! Application state shared across handlers.

use anyhow::{bail, Context, Result};
use point_store::{load_csv, IndexConfig, PointStore};
use renderer::ColorRamp;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storage::TileCache;
use tile_common::TileError;
use tracing::{info, warn};

use crate::config::{Args, TileConfig};
use crate::metrics::MetricsCollector;

/// Shared application state.
pub struct AppState {
    /// The point dataset, immutable after startup.
    pub store: Arc<PointStore>,
    pub cache: TileCache,
    pub ramp: Arc<ColorRamp>,
    pub config: TileConfig,
    pub metrics: Arc<MetricsCollector>,
    /// Contents of `<www>/index.html`, read once at startup.
    pub index_html: Option<String>,
    pub www_dir: PathBuf,
}

impl AppState {
    pub fn new(store: PointStore, cache: TileCache, ramp: ColorRamp, config: TileConfig) -> Self {
        let metrics = Arc::new(MetricsCollector::new());
        metrics.record_point_count(store.len());

        Self {
            store: Arc::new(store),
            cache,
            ramp: Arc::new(ramp),
            config,
            metrics,
            index_html: None,
            www_dir: PathBuf::from("./www"),
        }
    }

    /// Serve the web client from `www_dir`.
    pub fn with_www_dir(mut self, www_dir: impl Into<PathBuf>) -> Self {
        self.www_dir = www_dir.into();
        self.index_html = read_index_html(&self.www_dir);
        self
    }

    /// Load the dataset and build everything the server needs. Blocking.
    pub fn from_args(args: &Args) -> Result<Self> {
        let columns = match load_csv(&args.data) {
            Ok(columns) => columns,
            Err(TileError::DatasetMissing(path)) => {
                bail!("no {} found, run ./getdata.sh to download the dataset first", path)
            }
            Err(e) => return Err(e).context("failed to load dataset"),
        };

        let store = PointStore::build(
            columns.iter(),
            args.index,
            &IndexConfig {
                bucket_size: args.bucket_size,
            },
        );
        if store.is_empty() {
            warn!(path = %args.data.display(), "Dataset holds no points, every tile will be empty");
        }

        let ramp = match &args.ramp {
            Some(spec) => {
                let stops: Vec<&str> = spec.split(',').collect();
                ColorRamp::from_hex(&stops).context("invalid --ramp")?
            }
            None => ColorRamp::density(),
        };

        let cache = TileCache::with_max_mb(args.cache_max_mb);
        info!(
            points = store.len(),
            index = store.index_name(),
            cache_max_mb = args.cache_max_mb,
            max_zoom = args.max_zoom,
            "Application state ready"
        );

        Ok(Self::new(store, cache, ramp, TileConfig::from(args)).with_www_dir(&args.www_dir))
    }
}

fn read_index_html(www_dir: &Path) -> Option<String> {
    let path = www_dir.join("index.html");
    match std::fs::read_to_string(&path) {
        Ok(html) => Some(html),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "index.html not available, / will return 404");
            None
        }
    }
}
