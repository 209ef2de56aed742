//! Output directory handling and artifact discovery
//!
//! The extraction tool names its output itself (from the media title), so
//! the produced file is located after the fact: the regular file with the
//! most recent modification time in the directory the tool wrote into.

use crate::config::SettleConfig;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};

/// Root directory extraction output is written to
///
/// Created once at startup and passed explicitly to everything that reads
/// or writes artifacts.
#[derive(Debug, Clone)]
pub struct OutputDirectory {
    root: PathBuf,
}

impl OutputDirectory {
    /// Create the directory (and parents) if missing
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the directory cannot be created, e.g. due to
    /// permissions or a regular file in the way.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        tracing::debug!(path = %root.display(), "output directory ready");
        Ok(Self { root })
    }

    /// Directory path
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Create a scratch subdirectory for a single request
    pub async fn scratch_dir(&self, name: &str) -> Result<PathBuf> {
        let dir = self.root.join(name);
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir)
    }
}

/// The file selected as the result of an extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArtifact {
    /// Full path to the file
    pub path: PathBuf,
    /// Base file name, used for `Content-Disposition`
    pub file_name: String,
    /// Size in bytes at discovery time
    pub size: u64,
    /// Modification time at discovery time
    pub modified: SystemTime,
}

/// Find the most recently modified regular file directly inside `dir`
///
/// Subdirectories are ignored and entries whose metadata cannot be read are
/// skipped. Equal modification times are broken by file name, the
/// lexicographically greatest name winning.
///
/// # Errors
///
/// Returns [`Error::ArtifactNotFound`] if the directory cannot be read or
/// contains no regular file.
pub async fn find_newest_file(dir: &Path) -> Result<ExtractedArtifact> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| Error::ArtifactNotFound {
            dir: dir.to_path_buf(),
            reason: format!("failed to read directory: {e}"),
        })?;

    let mut newest: Option<ExtractedArtifact> = None;

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                return Err(Error::ArtifactNotFound {
                    dir: dir.to_path_buf(),
                    reason: format!("failed to read directory entry: {e}"),
                });
            }
        };

        let metadata = match entry.metadata().await {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!(path = %entry.path().display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }
        let Ok(modified) = metadata.modified() else {
            continue;
        };

        let candidate = ExtractedArtifact {
            path: entry.path(),
            file_name: entry.file_name().to_string_lossy().into_owned(),
            size: metadata.len(),
            modified,
        };

        let replace = match &newest {
            None => true,
            Some(current) => {
                (candidate.modified, &candidate.file_name) > (current.modified, &current.file_name)
            }
        };
        if replace {
            newest = Some(candidate);
        }
    }

    newest.ok_or_else(|| Error::ArtifactNotFound {
        dir: dir.to_path_buf(),
        reason: "no file found in directory".to_string(),
    })
}

/// Error for an artifact that was located but can no longer be read
pub(crate) fn artifact_unreadable(path: &Path, err: std::io::Error) -> Error {
    Error::ArtifactNotFound {
        dir: path.parent().unwrap_or(path).to_path_buf(),
        reason: format!("artifact {} is no longer readable: {err}", path.display()),
    }
}

async fn file_size(path: &Path) -> Result<u64> {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.len())
        .map_err(|e| artifact_unreadable(path, e))
}

/// Wait until a file's size stops changing
///
/// Reads the size every `poll_interval` and returns as soon as two
/// consecutive readings agree, or once `max_wait` has elapsed. Returns the
/// last size observed. Hitting the bound is not an error.
///
/// # Errors
///
/// Returns [`Error::ArtifactNotFound`] if the file disappears while waiting.
pub async fn wait_for_stable_size(path: &Path, settle: &SettleConfig) -> Result<u64> {
    let started = Instant::now();
    let mut last = file_size(path).await?;

    loop {
        if started.elapsed() >= settle.max_wait {
            tracing::debug!(path = %path.display(), size = last, "settle bound reached");
            return Ok(last);
        }

        tokio::time::sleep(settle.poll_interval).await;

        let current = file_size(path).await?;
        if current == last {
            return Ok(current);
        }
        tracing::trace!(path = %path.display(), previous = last, current, "artifact still growing");
        last = current;
    }
}
