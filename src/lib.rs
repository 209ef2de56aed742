//! # media-dl
//!
//! Small HTTP service that fetches a video from a public media URL with
//! `yt-dlp` and hands the resulting file back as a download.
//!
//! ## How a request flows
//!
//! 1. `POST /api/download` with `{"url": "...", "quality": "720p"}`
//! 2. The quality label becomes a `yt-dlp` format selector ([`FormatSpec`])
//! 3. The [`Orchestrator`] runs the [`Extractor`] into an output directory
//! 4. The newest file there is streamed back as an attachment
//!
//! ## Quick Start
//!
//! ```no_run
//! use media_dl::{Config, run_with_shutdown};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!
//!     // Serves until SIGTERM / SIGINT
//!     run_with_shutdown(config).await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// HTTP API module
pub mod api;
/// Output directory and artifact discovery
pub mod artifact;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// External extraction tool integration
pub mod extractor;
/// Quality tiers and format selectors
pub mod format;
/// Request pipeline
pub mod orchestrator;
/// Download request parsing and validation
pub mod request;

// Re-export commonly used types
pub use artifact::{ExtractedArtifact, OutputDirectory};
pub use config::{Config, ExtractorConfig, OutputConfig, OutputLayout, ServerConfig};
pub use error::{Error, Result, ToHttpStatus};
pub use extractor::{CliExtractor, ExtractionJob, ExtractionOutput, Extractor};
pub use format::{FormatSpec, Quality};
pub use orchestrator::Orchestrator;
pub use request::DownloadRequest;

use std::sync::Arc;

/// Run the service until a termination signal arrives.
///
/// Creates the output directory, resolves the extraction tool and serves
/// the HTTP API. In-flight requests are allowed to finish on shutdown.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Errors
///
/// Fails if the output directory cannot be created or the listener cannot
/// be bound. A missing `yt-dlp` is not fatal; it is logged and surfaces as
/// failed downloads.
pub async fn run_with_shutdown(config: Config) -> Result<()> {
    let output = OutputDirectory::create(&config.output.download_dir)?;

    let extractor = CliExtractor::from_config(&config.extractor);
    tracing::info!(
        extractor = extractor.name(),
        binary = ?extractor.binary_path(),
        available = extractor.is_available(),
        "extraction tool resolved"
    );

    let orchestrator = Arc::new(Orchestrator::new(
        Arc::new(extractor),
        output,
        &config.output,
    ));

    api::start_api_server(orchestrator, Arc::new(config), wait_for_signal()).await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
