// Main entry point for the media-dl HTTP service

use anyhow::{Context, Result};
use media_dl::{Config, run_with_shutdown};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,media_dl=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting media-dl");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        address = %config.server.bind_address(),
        download_dir = %config.output.download_dir.display(),
        layout = ?config.output.layout,
        "Configuration loaded"
    );

    run_with_shutdown(config).await.context("Server error")?;

    tracing::info!("Shutdown complete");
    Ok(())
}
