//! Download request parsing and validation

use crate::error::{Error, Result};
use crate::format::{FormatSpec, Quality};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// JSON body accepted by `POST /api/download`
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RawDownloadRequest {
    /// Source URL handed to the extraction tool
    #[serde(default)]
    pub url: Option<String>,

    /// Quality tier: "1080p", "720p", "480p"; anything else means best
    #[serde(default)]
    pub quality: Option<String>,
}

/// A validated download request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    url: String,
    quality: String,
}

impl DownloadRequest {
    /// Build a request directly, applying the same `url` rule as [`from_body`](Self::from_body)
    pub fn new(url: impl Into<String>, quality: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(Error::MalformedInput("missing 'url' field".into()));
        }
        Ok(Self {
            url,
            quality: quality.into(),
        })
    }

    /// Parse and validate a raw request body
    ///
    /// Fails with [`Error::MalformedInput`] when the body is not a JSON object
    /// of the expected shape or `url` is absent/empty. `quality` defaults to "".
    pub fn from_body(body: &[u8]) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| Error::MalformedInput(format!("invalid JSON: {e}")))?;
        // serde would also accept a positional array for the struct
        if !value.is_object() {
            return Err(Error::MalformedInput(
                "request body must be a JSON object".into(),
            ));
        }
        let raw: RawDownloadRequest = serde_json::from_value(value)
            .map_err(|e| Error::MalformedInput(format!("invalid request body: {e}")))?;

        Self::new(raw.url.unwrap_or_default(), raw.quality.unwrap_or_default())
    }

    /// Source URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Quality label exactly as the client sent it
    pub fn quality(&self) -> &str {
        &self.quality
    }

    /// Resolved quality tier
    pub fn tier(&self) -> Quality {
        Quality::from_label(&self.quality)
    }

    /// yt-dlp format expression for this request
    pub fn format_spec(&self) -> FormatSpec {
        self.tier().format_spec()
    }
}
