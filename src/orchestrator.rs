//! Extraction pipeline: invoke the tool, let the output settle, locate it
//!
//! With [`OutputLayout::PerRequest`] every request gets its own scratch
//! directory named by a fresh request id, so concurrent requests cannot pick
//! up each other's files. A scratch directory whose request fails is removed
//! again. With [`OutputLayout::Shared`] the tool writes into the flat output
//! directory and requests run one at a time.

use crate::artifact::{self, ExtractedArtifact, OutputDirectory};
use crate::config::{OutputConfig, OutputLayout, SettleConfig};
use crate::error::Result;
use crate::extractor::{ExtractionJob, Extractor};
use crate::request::DownloadRequest;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::Instrument;
use uuid::Uuid;

/// Drives one download request from tool invocation to a located artifact
pub struct Orchestrator {
    extractor: Arc<dyn Extractor>,
    output: OutputDirectory,
    layout: OutputLayout,
    settle: SettleConfig,
    // held across invoke + discover when the layout is shared
    shared_lock: Mutex<()>,
}

impl Orchestrator {
    /// Create an orchestrator writing into `output`
    pub fn new(
        extractor: Arc<dyn Extractor>,
        output: OutputDirectory,
        config: &OutputConfig,
    ) -> Self {
        Self {
            extractor,
            output,
            layout: config.layout,
            settle: config.settle,
            shared_lock: Mutex::new(()),
        }
    }

    /// Output directory artifacts are written to
    pub fn output(&self) -> &OutputDirectory {
        &self.output
    }

    /// Extractor used for invocations
    pub fn extractor(&self) -> &dyn Extractor {
        self.extractor.as_ref()
    }

    /// Output layout in effect
    pub fn layout(&self) -> OutputLayout {
        self.layout
    }

    /// Run the extraction for `request` and return the produced artifact
    ///
    /// # Errors
    ///
    /// - [`crate::Error::ExtractionFailed`] if the tool fails or cannot start
    /// - [`crate::Error::ArtifactNotFound`] if the tool succeeded but left no
    ///   file, or the file vanished before it settled
    /// - [`crate::Error::Io`] if the scratch directory cannot be created
    pub async fn fetch(&self, request: &DownloadRequest) -> Result<ExtractedArtifact> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("download", %request_id);

        async move {
            match self.layout {
                OutputLayout::PerRequest => {
                    let dir = self.output.scratch_dir(&request_id.to_string()).await?;
                    let result = self.run(request, &dir).await;
                    if result.is_err() {
                        discard_scratch_dir(&dir).await;
                    }
                    result
                }
                OutputLayout::Shared => {
                    let _guard = self.shared_lock.lock().await;
                    self.run(request, self.output.path()).await
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, request: &DownloadRequest, dir: &Path) -> Result<ExtractedArtifact> {
        let format = request.format_spec();
        tracing::info!(
            url = request.url(),
            quality = request.quality(),
            format = %format,
            dir = %dir.display(),
            extractor = self.extractor.name(),
            "download requested"
        );

        let job = ExtractionJob {
            url: request.url(),
            format: &format,
            output_dir: dir,
        };
        let output = self.extractor.extract(&job).await?;
        tracing::debug!(diagnostics = %output.diagnostics, "extraction finished");

        let mut artifact = artifact::find_newest_file(dir).await?;
        artifact.size = artifact::wait_for_stable_size(&artifact.path, &self.settle).await?;

        tracing::info!(
            file = %artifact.file_name,
            size = artifact.size,
            "artifact ready"
        );
        Ok(artifact)
    }
}

/// Remove a failed request's scratch directory and whatever the tool left in it
async fn discard_scratch_dir(dir: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(dir).await {
        tracing::debug!(dir = %dir.display(), error = %e, "failed to remove scratch directory");
    }
}
