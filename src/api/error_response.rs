//! HTTP error response handling for the API
//!
//! Every pipeline failure is turned into a response here. The full error,
//! including captured tool output, is logged; the client receives only a
//! generic plain-text message.

use crate::error::{Error, ToHttpStatus};
use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

/// Implement IntoResponse for Error to automatically convert errors to HTTP responses
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(&self);

        let mut response = (status_code, self.public_message()).into_response();
        if matches!(self, Error::MethodNotAllowed) {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("POST, OPTIONS"));
        }
        response
    }
}

fn log_error(error: &Error) {
    let code = error.error_code();
    match error {
        Error::MalformedInput(reason) => {
            tracing::warn!(code, %reason, "rejected download request");
        }
        Error::MethodNotAllowed => {
            tracing::debug!(code, "method not allowed");
        }
        Error::ExtractionFailed {
            reason,
            exit_code,
            output,
        } => {
            tracing::error!(code, %reason, ?exit_code, %output, "extraction tool failed");
        }
        Error::ArtifactNotFound { dir, reason } => {
            tracing::error!(code, dir = %dir.display(), %reason, "error finding downloaded file");
        }
        other => {
            tracing::error!(code, error = %other, "request failed");
        }
    }
}
