//! HTTP API server module
//!
//! Exposes the download endpoint plus a few system routes, documented with an
//! OpenAPI 3 spec.

use crate::orchestrator::Orchestrator;
use crate::{Config, Result};
use axum::{
    Router,
    http::{Method, header},
    middleware,
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Path of the download endpoint
pub const DOWNLOAD_PATH: &str = "/api/download";

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Download
/// - `POST /api/download` - Fetch media and stream it back as an attachment
/// - `OPTIONS /api/download` - CORS preflight
/// - any other method on `/api/download` - 405
///
/// Every response on `/api/download` carries the CORS headers.
///
/// ## Files
/// - `GET /downloads/*` - Previously extracted files (if enabled)
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /capabilities` - Extractor and output configuration
/// - `GET /openapi.json` - OpenAPI specification
pub fn create_router(orchestrator: Arc<Orchestrator>, config: Arc<Config>) -> Router {
    let downloads_root = orchestrator.output().path().to_path_buf();
    let state = AppState::new(orchestrator, config.clone());

    // The download endpoint always answers with its own fixed CORS headers,
    // so it stays outside the CorsLayer (which would swallow OPTIONS).
    let download = Router::new().route(
        DOWNLOAD_PATH,
        post(routes::download)
            .options(routes::preflight)
            .fallback(routes::method_not_allowed)
            .layer(middleware::map_response(routes::cors_headers)),
    );

    let system = Router::new()
        .route("/health", get(routes::health_check))
        .route("/capabilities", get(routes::get_capabilities))
        .route("/openapi.json", get(routes::openapi_spec));

    let system = if config.server.serve_downloads {
        system.nest_service("/downloads", ServeDir::new(downloads_root))
    } else {
        system
    };

    let system = if config.server.cors_enabled {
        system.layer(build_cors_layer())
    } else {
        system
    };

    download
        .merge(system)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// CORS policy for browser clients: any origin, POST/OPTIONS, `Content-Type`
fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Start the API server on the configured bind address.
///
/// Runs until `shutdown` resolves, then stops accepting connections and
/// waits for in-flight requests to finish.
///
/// # Errors
///
/// Returns [`crate::Error::Io`] if the address cannot be bound and
/// [`crate::Error::ApiServerError`] if serving fails.
///
/// # Example
///
/// ```no_run
/// use media_dl::{Config, CliExtractor, Orchestrator, OutputDirectory};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let output = OutputDirectory::create(&config.output.download_dir)?;
/// let extractor = Arc::new(CliExtractor::from_config(&config.extractor));
/// let orchestrator = Arc::new(Orchestrator::new(extractor, output, &config.output));
///
/// media_dl::api::start_api_server(orchestrator, config, async {
///     let _ = tokio::signal::ctrl_c().await;
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server<F>(
    orchestrator: Arc<Orchestrator>,
    config: Arc<Config>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_address = config.server.bind_address();

    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(orchestrator, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(address = %bind_address, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
