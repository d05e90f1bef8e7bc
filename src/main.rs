use std::fs::File;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cinetheque::gateway::{ApiGateway, CatalogApi};

const LOG_FILE: &str = "cinetheque.log";

/// The terminal belongs to the UI, so logs go to a file.
fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_file = File::create(LOG_FILE)
        .with_context(|| format!("Failed to create log file {LOG_FILE}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing()?;

    let gateway = ApiGateway::from_env()?;
    info!("Starting Cinéthèque client");

    let api: Arc<dyn CatalogApi> = Arc::new(gateway);
    cinetheque::tui::run(api).await
}
