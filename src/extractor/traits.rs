//! Traits and types for media extraction

use crate::format::FormatSpec;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Everything an extractor needs to run a single job
#[derive(Debug, Clone, Copy)]
pub struct ExtractionJob<'a> {
    /// Source URL
    pub url: &'a str,
    /// Format-selection expression
    pub format: &'a FormatSpec,
    /// Directory the artifact must be written into
    pub output_dir: &'a Path,
}

/// Result of a successful extraction
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct ExtractionOutput {
    /// Captured tool output (stdout followed by stderr)
    pub diagnostics: String,
}

/// Trait for running media extractions
///
/// Implementations block (asynchronously) until the extraction has
/// finished. A successful return means the artifact has been written to
/// [`ExtractionJob::output_dir`]; how it is named is up to the tool.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Run one extraction to completion
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ExtractionFailed`] if the tool cannot be
    /// started or exits with a non-zero status.
    async fn extract(&self, job: &ExtractionJob<'_>) -> crate::Result<ExtractionOutput>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;

    /// Path of the executable this extractor runs, if any
    fn binary_path(&self) -> Option<PathBuf> {
        None
    }

    /// Whether the extractor can currently run
    fn is_available(&self) -> bool {
        true
    }
}
