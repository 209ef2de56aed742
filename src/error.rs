//! Error types for media-dl
//!
//! This module provides the error taxonomy for the request pipeline:
//! - Client errors (malformed request bodies, wrong HTTP method)
//! - Extraction errors (yt-dlp exited non-zero or could not be started)
//! - Discovery errors (the tool succeeded but no artifact was found)
//! - HTTP status code mapping for API integration

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for media-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for media-dl
///
/// Every variant is terminal for the request that produced it. Diagnostic
/// detail stays in the error value and is logged server-side; clients only
/// ever see [`Error::public_message`].
#[derive(Debug, Error)]
pub enum Error {
    /// Request body could not be parsed, or `url` is missing/empty
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The extraction tool exited non-zero or could not be launched
    #[error("extraction failed: {reason}")]
    ExtractionFailed {
        /// Short description of what went wrong (exit status or launch error)
        reason: String,
        /// Process exit code, if the process ran and exited normally
        exit_code: Option<i32>,
        /// Captured stdout followed by stderr
        output: String,
    },

    /// The extraction tool succeeded but no artifact could be located
    #[error("no artifact found in {dir}: {reason}")]
    ArtifactNotFound {
        /// The directory that was scanned
        dir: PathBuf,
        /// Why nothing was selected (empty directory, read error, ...)
        reason: String,
    },

    /// HTTP method not supported on the download endpoint
    #[error("method not allowed")]
    MethodNotAllowed,

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "PORT")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

impl Error {
    /// Generic, non-sensitive message sent to HTTP clients
    pub fn public_message(&self) -> &'static str {
        match self {
            Error::MalformedInput(_) => "Invalid JSON or missing 'url' field",
            Error::ExtractionFailed { .. } => "Failed to download video",
            Error::ArtifactNotFound { .. } => "Download succeeded but file not found",
            Error::MethodNotAllowed => "Method not allowed",
            Error::Config { .. } | Error::Io(_) | Error::ApiServerError(_) => {
                "Internal server error"
            }
        }
    }
}

/// Convert errors to HTTP status codes for API responses
///
/// This trait maps domain errors to appropriate HTTP status codes.
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::MalformedInput(_) => 400,

            // 405 Method Not Allowed
            Error::MethodNotAllowed => 405,

            // 500 Internal Server Error - extraction, discovery and server-side issues
            Error::ExtractionFailed { .. } => 500,
            Error::ArtifactNotFound { .. } => 500,
            Error::Config { .. } => 500,
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::MalformedInput(_) => "malformed_input",
            Error::ExtractionFailed { .. } => "extraction_failed",
            Error::ArtifactNotFound { .. } => "artifact_not_found",
            Error::MethodNotAllowed => "method_not_allowed",
            Error::Config { .. } => "config_error",
            Error::Io(_) => "io_error",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}
