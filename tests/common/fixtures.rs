//! Stand-in extraction tools and an app wired to them
//!
//! The stubs are plain `sh` scripts run as `/bin/sh <script> <args...>`, so
//! they behave like `yt-dlp` from the service's point of view without needing
//! the real tool or network access.

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use media_dl::config::{OutputConfig, SettleConfig};
use media_dl::{CliExtractor, Config, Orchestrator, OutputDirectory, OutputLayout};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

/// Contents written by [`writing_tool`]
pub const STUB_CONTENT: &str = "stub media payload";

/// A tool that writes `file_name` next to the `-o` template, logging its
/// arguments one per line to `args_log`
pub fn writing_tool(file_name: &str, args_log: &Path) -> String {
    format!(
        r#"out=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-o" ]; then out="$arg"; fi
  prev="$arg"
done
printf '%s\n' "$@" > '{log}'
if [ -z "$out" ]; then
  echo "ERROR: no output template" >&2
  exit 2
fi
dir=$(dirname "$out")
printf '%s' '{content}' > "$dir/{name}"
echo "[download] Destination: $dir/{name}"
"#,
        log = args_log.display(),
        content = STUB_CONTENT,
        name = file_name,
    )
}

/// A tool that exits with `code` after printing an error
pub fn failing_tool(code: i32) -> String {
    format!("echo '[generic] Extracting URL'\necho 'ERROR: [generic] Unsupported URL' >&2\nexit {code}\n")
}

/// A tool that leaves a partial file next to the `-o` template and then fails
pub fn interrupted_tool() -> String {
    format!(
        r#"out=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-o" ]; then out="$arg"; fi
  prev="$arg"
done
printf 'partial' > "$(dirname "$out")/clip.mp4.part"
{fail}"#,
        fail = failing_tool(1),
    )
}

/// Router backed by a [`CliExtractor`] running a stub script
pub struct StubApp {
    pub router: Router,
    /// Where the service writes artifacts
    pub output: TempDir,
    /// Holds the script and its argument log
    pub tools: TempDir,
}

impl StubApp {
    /// Build an app whose extraction tool runs `script`
    pub fn new(script: impl FnOnce(&Path) -> String, layout: OutputLayout) -> Self {
        let output = TempDir::new().unwrap();
        let tools = TempDir::new().unwrap();

        let script_path = tools.path().join("yt-dlp.sh");
        std::fs::write(&script_path, script(&tools.path().join("args.log"))).unwrap();

        let mut config = Config::default();
        config.output = OutputConfig {
            download_dir: output.path().to_path_buf(),
            layout,
            settle: SettleConfig {
                poll_interval: Duration::from_millis(10),
                max_wait: Duration::from_millis(200),
            },
        };

        // Same wiring as the binary, with the interpreter standing in for the tool
        config.extractor.binary_path = Some(PathBuf::from("/bin/sh"));
        let extractor = CliExtractor::from_config(&config.extractor).with_leading_args([&script_path]);
        let orchestrator = Arc::new(Orchestrator::new(
            Arc::new(extractor),
            OutputDirectory::create(output.path()).unwrap(),
            &config.output,
        ));
        let router = media_dl::api::create_router(orchestrator, Arc::new(config));

        Self {
            router,
            output,
            tools,
        }
    }

    /// POST a JSON body to the download endpoint
    pub async fn download(&self, body: &str) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri(media_dl::api::DOWNLOAD_PATH)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Arguments the stub was last invoked with
    pub fn recorded_args(&self) -> Vec<String> {
        std::fs::read_to_string(self.tools.path().join("args.log"))
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Files under the output directory, relative and sorted
    pub fn output_files(&self) -> Vec<PathBuf> {
        fn walk(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) {
            for entry in std::fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    walk(root, &path, out);
                } else {
                    out.push(path.strip_prefix(root).unwrap().to_path_buf());
                }
            }
        }

        let mut files = Vec::new();
        walk(self.output.path(), self.output.path(), &mut files);
        files.sort();
        files
    }
}

/// Collect a response body
pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}
