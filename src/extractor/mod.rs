//! External media-extraction tool integration
//!
//! The core abstraction is the [`Extractor`] trait: given a URL, a format
//! expression and a target directory, run an extraction to completion and
//! leave the artifact in that directory.
//!
//! - [`CliExtractor`]: runs the external `yt-dlp` binary
//!
//! ## Usage
//!
//! ```no_run
//! use media_dl::extractor::{CliExtractor, ExtractionJob, Extractor};
//! use media_dl::format::FormatSpec;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let extractor = CliExtractor::from_path().expect("yt-dlp not found");
//!
//!     let format = FormatSpec::for_quality("720p");
//!     let job = ExtractionJob {
//!         url: "https://example.com/watch?v=1",
//!         format: &format,
//!         output_dir: Path::new("downloads"),
//!     };
//!     let output = extractor.extract(&job).await?;
//!     println!("{}", output.diagnostics);
//!
//!     Ok(())
//! }
//! ```

mod cli;
mod traits;

pub use cli::{BrowserHeaders, CliExtractor, DEFAULT_BINARY_NAME, OUTPUT_TEMPLATE};
pub use traits::{ExtractionJob, ExtractionOutput, Extractor};
