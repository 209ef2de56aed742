//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the media-dl HTTP API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the media-dl HTTP API
///
/// Served as JSON at `/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "media-dl HTTP API",
        version = "0.1.0",
        description = "Fetch a video from a public media URL and receive it as a file download",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        // Download
        crate::api::routes::download,
        crate::api::routes::preflight,

        // System
        crate::api::routes::health_check,
        crate::api::routes::get_capabilities,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        crate::request::RawDownloadRequest,
        crate::config::OutputLayout,
        crate::api::routes::Capabilities,
    )),
    tags(
        (name = "download", description = "Fetch media by URL and stream it back as an attachment"),
        (name = "system", description = "System endpoints - Health checks, capabilities, OpenAPI spec"),
    )
)]
pub struct ApiDoc;
