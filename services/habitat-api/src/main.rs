//! Habitat suitability overlay service.
//!
//! HTTP server that composites habitat factor rasters into a colour overlay
//! for the map UI.

use anyhow::{Context, Result};
use clap::Parser;
use std::{env, net::SocketAddr, path::PathBuf, sync::Arc};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use habitat_api::{build_router, config::AppConfig, state::AppState};

#[derive(Parser, Debug)]
#[command(name = "habitat-api")]
#[command(about = "Habitat suitability overlay server")]
struct Args {
    /// Configuration file
    #[arg(short, long, env = "HABITAT_CONFIG", default_value = "config/habitat.yaml")]
    config: PathBuf,

    /// Listen address (overrides the config file)
    #[arg(short, long, env = "HABITAT_LISTEN")]
    listen: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Number of tokio worker threads (default: number of CPU cores)
    #[arg(long)]
    worker_threads: Option<usize>,
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build tokio runtime with configurable worker threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    } else if let Ok(threads_str) = env::var("TOKIO_WORKER_THREADS") {
        if let Ok(threads) = threads_str.parse::<usize>() {
            runtime_builder.worker_threads(threads);
        }
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(args))?;
    Ok(())
}

async fn async_main(args: Args) -> Result<()> {
    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Initialize Prometheus metrics exporter
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    info!("Prometheus metrics exporter initialized");

    let mut config = AppConfig::load(&args.config)?;
    if let Some(listen) = args.listen {
        config.listen = listen;
    }

    info!(
        catalog = %config.catalog_path.display(),
        base = %config.base_raster.display(),
        static_dir = %config.static_dir.display(),
        "Starting habitat overlay server"
    );

    // Catalog and base raster are read once; failures abort startup
    let listen = config.listen.clone();
    let state = Arc::new(tokio::task::spawn_blocking(move || AppState::new(config)).await??);

    let app = build_router(state, prometheus_handle);

    // Parse listen address
    let addr: SocketAddr = listen
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", listen))?;
    info!(address = %addr, "Listening");

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
