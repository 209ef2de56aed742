//! CLI-based extractor using the external yt-dlp binary

use super::traits::{ExtractionJob, ExtractionOutput, Extractor};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Name of the executable looked up on `PATH`
pub const DEFAULT_BINARY_NAME: &str = "yt-dlp";

/// yt-dlp output template, relative to the job's output directory
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Browser-like request headers passed to yt-dlp
///
/// Some hosts reject requests that do not look like they come from a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserHeaders {
    /// Value for `--user-agent`
    pub user_agent: String,
    /// Value for `--referer`
    pub referer: String,
}

/// Extractor that shells out to yt-dlp
///
/// # Examples
///
/// ```no_run
/// use media_dl::extractor::CliExtractor;
/// use std::path::PathBuf;
///
/// // Explicit path
/// let extractor = CliExtractor::new(PathBuf::from("/usr/local/bin/yt-dlp"));
///
/// // Or auto-discover from PATH
/// let extractor = CliExtractor::from_path().expect("yt-dlp not found in PATH");
///
/// // Or run the Python module
/// let extractor = CliExtractor::new(PathBuf::from("python3"))
///     .with_leading_args(["-m", "yt_dlp"]);
/// ```
#[derive(Debug, Clone)]
pub struct CliExtractor {
    binary_path: PathBuf,
    leading_args: Vec<OsString>,
    merge_output_format: String,
    headers: Option<BrowserHeaders>,
}

impl CliExtractor {
    /// Create a new CLI extractor with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self {
            binary_path,
            leading_args: Vec::new(),
            merge_output_format: "mp4".to_string(),
            headers: None,
        }
    }

    /// Attempt to find yt-dlp in PATH
    ///
    /// Uses the `which` crate to search for the `yt-dlp` binary.
    pub fn from_path() -> Option<Self> {
        which::which(DEFAULT_BINARY_NAME).ok().map(Self::new)
    }

    /// Build an extractor from configuration
    ///
    /// Uses the configured path if set, then `PATH`. When nothing is found
    /// the bare binary name is kept, so invocations fail as
    /// [`crate::Error::ExtractionFailed`] rather than at startup.
    pub fn from_config(config: &crate::config::ExtractorConfig) -> Self {
        let base = match &config.binary_path {
            Some(path) => Self::new(path.clone()),
            None => Self::from_path().unwrap_or_else(|| {
                tracing::warn!(
                    binary = DEFAULT_BINARY_NAME,
                    "extraction tool not found in PATH; downloads will fail until it is installed"
                );
                Self::new(PathBuf::from(DEFAULT_BINARY_NAME))
            }),
        };

        let base = base.with_merge_output_format(config.merge_output_format.clone());
        if config.impersonate {
            base.with_browser_headers(BrowserHeaders {
                user_agent: config.user_agent.clone(),
                referer: config.referer.clone(),
            })
        } else {
            base
        }
    }

    /// Arguments inserted before the yt-dlp arguments (e.g. `-m yt_dlp`)
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Container passed to `--merge-output-format`
    pub fn with_merge_output_format(mut self, format: impl Into<String>) -> Self {
        self.merge_output_format = format.into();
        self
    }

    /// Send browser-like headers with every request
    pub fn with_browser_headers(mut self, headers: BrowserHeaders) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Full argument list for a job, excluding the program itself
    pub fn build_args(&self, job: &ExtractionJob<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.leading_args.clone();

        if let Some(headers) = &self.headers {
            args.push("--user-agent".into());
            args.push(headers.user_agent.clone().into());
            args.push("--referer".into());
            args.push(headers.referer.clone().into());
        }

        args.push("-f".into());
        args.push(job.format.as_str().into());
        args.push("--merge-output-format".into());
        args.push(self.merge_output_format.clone().into());
        args.push("-o".into());
        args.push(job.output_dir.join(OUTPUT_TEMPLATE).into_os_string());
        // a URL starting with '-' must not be read as an option
        args.push("--".into());
        args.push(job.url.into());

        args
    }
}

fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut combined = String::from_utf8_lossy(stdout).into_owned();
    if !stderr.is_empty() {
        if !combined.is_empty() && !combined.ends_with('\n') {
            combined.push('\n');
        }
        combined.push_str(&String::from_utf8_lossy(stderr));
    }
    combined
}

#[async_trait]
impl Extractor for CliExtractor {
    async fn extract(&self, job: &ExtractionJob<'_>) -> crate::Result<ExtractionOutput> {
        tracing::debug!(
            binary = %self.binary_path.display(),
            url = job.url,
            format = %job.format,
            output_dir = %job.output_dir.display(),
            "running extraction tool"
        );

        let output = Command::new(&self.binary_path)
            .args(self.build_args(job))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| crate::Error::ExtractionFailed {
                reason: format!(
                    "Failed to execute {}: {}",
                    self.binary_path.display(),
                    e
                ),
                exit_code: None,
                output: String::new(),
            })?;

        let diagnostics = combine_output(&output.stdout, &output.stderr);

        if !output.status.success() {
            return Err(crate::Error::ExtractionFailed {
                reason: format!("{} exited with {}", self.binary_path.display(), output.status),
                exit_code: output.status.code(),
                output: diagnostics,
            });
        }

        Ok(ExtractionOutput { diagnostics })
    }

    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }

    fn binary_path(&self) -> Option<PathBuf> {
        Some(self.binary_path.clone())
    }

    fn is_available(&self) -> bool {
        self.binary_path.is_file() || which::which(&self.binary_path).is_ok()
    }
}
