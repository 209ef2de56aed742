//! System handlers: health, capabilities, OpenAPI.

use crate::api::AppState;
use crate::config::OutputLayout;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

/// What this instance can do, as configured at startup
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Capabilities {
    /// Extractor backend name
    pub extractor: String,
    /// Resolved path of the extraction tool, if known
    pub binary_path: Option<String>,
    /// Whether the extraction tool was found
    pub available: bool,
    /// How extraction output is laid out on disk
    pub output_layout: OutputLayout,
    /// Whether finished files are served under `/downloads`
    pub serve_downloads: bool,
    /// Service version
    pub version: String,
}

/// GET /health - Health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is healthy")
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /capabilities - Query extractor and output configuration
#[utoipa::path(
    get,
    path = "/capabilities",
    tag = "system",
    responses(
        (status = 200, description = "Current capabilities", body = Capabilities)
    )
)]
pub async fn get_capabilities(State(state): State<AppState>) -> impl IntoResponse {
    let extractor = state.orchestrator.extractor();
    let capabilities = Capabilities {
        extractor: extractor.name().to_string(),
        binary_path: extractor
            .binary_path()
            .map(|p| p.to_string_lossy().into_owned()),
        available: extractor.is_available(),
        output_layout: state.orchestrator.layout(),
        serve_downloads: state.config.server.serve_downloads,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    (StatusCode::OK, Json(capabilities))
}

/// GET /openapi.json - OpenAPI specification
#[utoipa::path(
    get,
    path = "/openapi.json",
    tag = "system",
    responses(
        (status = 200, description = "OpenAPI specification in JSON format")
    )
)]
pub async fn openapi_spec() -> impl IntoResponse {
    use crate::api::openapi::ApiDoc;
    use utoipa::OpenApi;

    Json(ApiDoc::openapi())
}
