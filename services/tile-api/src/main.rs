//! Density heatmap tile server.
//!
//! Serves `/tiles/{z}/{x}/{y}.png` rendered from a static point dataset.

use anyhow::{Context, Result};
use clap::Parser;
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use tile_api::config::{Args, LogFormat};
use tile_api::state::AppState;

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args)?;

    // Build tokio runtime with configurable worker threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(threads) = args.worker_threads {
        info!("Configuring tokio runtime with {} worker threads", threads);
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(args))
}

fn init_tracing(args: &Args) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder().with_max_level(level);
    match args.log_format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
    }
    Ok(())
}

async fn async_main(args: Args) -> Result<()> {
    // Initialize Prometheus metrics exporter
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder")?;

    info!(data = %args.data.display(), index = %args.index, "Starting density tile server");

    // Dataset load and index build finish before the listener binds.
    let startup_args = args.clone();
    let state = tokio::task::spawn_blocking(move || AppState::from_args(&startup_args))
        .await
        .context("startup task panicked")??;
    let state = Arc::new(state);

    let app = tile_api::app(state, prometheus_handle);

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("invalid listen address '{}'", args.listen))?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
