//! Download endpoint handlers.

use crate::api::AppState;
use crate::artifact::{ExtractedArtifact, artifact_unreadable};
use crate::error::{Error, Result};
use crate::request::DownloadRequest;
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use tokio_util::io::ReaderStream;

/// POST /api/download - Fetch media and stream it back as an attachment
#[utoipa::path(
    post,
    path = "/api/download",
    tag = "download",
    request_body = crate::request::RawDownloadRequest,
    responses(
        (status = 200, description = "The extracted media file", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid JSON or missing 'url' field", content_type = "text/plain"),
        (status = 405, description = "Method not allowed", content_type = "text/plain"),
        (status = 500, description = "Extraction failed or produced no file", content_type = "text/plain")
    )
)]
pub async fn download(State(state): State<AppState>, body: Bytes) -> Result<Response> {
    let request = DownloadRequest::from_body(&body)?;
    let artifact = state.orchestrator.fetch(&request).await?;
    stream_artifact(&artifact).await
}

/// OPTIONS /api/download - CORS preflight
///
/// The CORS headers themselves come from [`cors_headers`].
#[utoipa::path(
    options,
    path = "/api/download",
    tag = "download",
    responses(
        (status = 200, description = "Preflight accepted; CORS headers set, empty body")
    )
)]
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Any other method on /api/download
pub async fn method_not_allowed() -> Error {
    Error::MethodNotAllowed
}

/// Stamp the endpoint's CORS headers onto every response from /api/download
pub async fn cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

/// Build a response that streams `artifact` as a file download
///
/// The body is read from disk in chunks rather than buffered. A file that
/// vanished since it was located is [`Error::ArtifactNotFound`].
pub async fn stream_artifact(artifact: &ExtractedArtifact) -> Result<Response> {
    let file = tokio::fs::File::open(&artifact.path)
        .await
        .map_err(|e| artifact_unreadable(&artifact.path, e))?;
    let length = file
        .metadata()
        .await
        .map_err(|e| artifact_unreadable(&artifact.path, e))?
        .len();
    let body = Body::from_stream(ReaderStream::new(file));

    Response::builder()
        .status(StatusCode::OK)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(&artifact.file_name),
        )
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, length)
        .body(body)
        .map_err(|e| Error::ApiServerError(format!("failed to build response: {e}")))
}

/// `Content-Disposition` value forcing a download named `file_name`
///
/// Names made only of HTTP token characters are sent bare
/// (`attachment; filename=clip.mp4`). Anything else gets a quoted ASCII
/// fallback plus an RFC 5987 `filename*` carrying the exact UTF-8 name.
pub fn content_disposition(file_name: &str) -> String {
    if !file_name.is_empty() && file_name.bytes().all(is_token_byte) {
        return format!("attachment; filename={file_name}");
    }

    let fallback: String = file_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(file_name)
    )
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}
