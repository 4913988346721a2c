mod api;
mod config;
mod dataset;
mod engine;
mod error;
mod matcher;
mod model;
mod scrape;
mod types;

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::dataset::Dataset;
use crate::engine::Engine;
use crate::error::Result;
use crate::scrape::Scraper;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    let engine = Arc::new(Engine::new());

    // Auto-initialize when the data file is already on disk; otherwise wait
    // for POST /api/initialize.
    if std::path::Path::new(&cfg.data_path).exists() {
        match Dataset::load(&cfg.data_path) {
            Ok(dataset) => {
                engine.reinitialize(dataset);
                let (records, products) = engine.dataset_summary()?;
                info!(
                    "Auto-initialized from {}: {records} records, {products} unique products",
                    cfg.data_path
                );
            }
            Err(e) => warn!("Failed to auto-load {}: {e}", cfg.data_path),
        }
    } else {
        warn!("No {} found — POST /api/initialize to load a dataset", cfg.data_path);
    }

    let scraper = Scraper::new()?;
    let app = router(ApiState { engine, scraper });
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
