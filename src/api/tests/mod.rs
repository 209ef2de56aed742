use super::*;
use crate::artifact::OutputDirectory;
use crate::config::{OutputConfig, OutputLayout, SettleConfig};
use crate::extractor::{ExtractionJob, ExtractionOutput, Extractor};
use async_trait::async_trait;
use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::Response;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;


/// What the fake tool does when invoked
#[derive(Clone)]
enum Behavior {
    /// Write `name` with `content` into the job directory
    Write {
        name: &'static str,
        content: &'static [u8],
    },
    /// Exit non-zero with this diagnostic output
    Fail(&'static str),
    /// Exit zero without producing anything
    Silent,
}

/// In-process stand-in for the extraction tool
struct FakeExtractor {
    behavior: Behavior,
    calls: AtomicUsize,
    formats: Mutex<Vec<String>>,
}

impl FakeExtractor {
    fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
            formats: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn formats(&self) -> Vec<String> {
        self.formats.lock().unwrap().clone()
    }
}

#[async_trait]
impl Extractor for FakeExtractor {
    async fn extract(&self, job: &ExtractionJob<'_>) -> crate::Result<ExtractionOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.formats
            .lock()
            .unwrap()
            .push(job.format.as_str().to_string());

        match &self.behavior {
            Behavior::Write { name, content } => {
                tokio::fs::write(job.output_dir.join(name), content).await?;
                Ok(ExtractionOutput::default())
            }
            Behavior::Fail(output) => Err(crate::Error::ExtractionFailed {
                reason: "yt-dlp exited with exit status: 1".into(),
                exit_code: Some(1),
                output: (*output).to_string(),
            }),
            Behavior::Silent => Ok(ExtractionOutput::default()),
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Router wired to a fake extractor over a temporary output directory
struct TestApp {
    router: Router,
    extractor: Arc<FakeExtractor>,
    dir: TempDir,
}

impl TestApp {
    fn new(behavior: Behavior) -> Self {
        Self::with_config(behavior, Config::default())
    }

    fn with_layout(behavior: Behavior, layout: OutputLayout) -> Self {
        let mut config = Config::default();
        config.output.layout = layout;
        Self::with_config(behavior, config)
    }

    fn with_config(behavior: Behavior, mut config: Config) -> Self {
        let dir = TempDir::new().unwrap();
        config.output = OutputConfig {
            download_dir: dir.path().to_path_buf(),
            settle: SettleConfig {
                poll_interval: Duration::from_millis(5),
                max_wait: Duration::from_millis(50),
            },
            ..config.output
        };

        let extractor = FakeExtractor::new(behavior);
        let output = OutputDirectory::create(dir.path()).unwrap();
        let orchestrator = Arc::new(crate::Orchestrator::new(
            extractor.clone(),
            output,
            &config.output,
        ));
        let router = create_router(orchestrator, Arc::new(config));

        Self {
            router,
            extractor,
            dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn post_json(&self, body: &str) -> Response {
        self.send(
            Request::builder()
                .method("POST")
                .uri(DOWNLOAD_PATH)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Names of the entries directly inside the output directory, sorted
    fn entries(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

fn header_value<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn test_api_server_serves_until_shutdown() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.server.host = "127.0.0.1".parse().unwrap();
    config.server.port = 0; // OS assigns a free port
    config.output.download_dir = dir.path().to_path_buf();
    let config = Arc::new(config);

    let output = OutputDirectory::create(dir.path()).unwrap();
    let orchestrator = Arc::new(crate::Orchestrator::new(
        FakeExtractor::new(Behavior::Silent),
        output,
        &config.output,
    ));

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(start_api_server(orchestrator, config, async move {
        let _ = rx.await;
    }));

    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server should stop after shutdown signal")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_api_server_reports_bind_failure() {
    let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = occupied.local_addr().unwrap().port();

    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.server.host = "127.0.0.1".parse().unwrap();
    config.server.port = port;
    let output = OutputDirectory::create(dir.path()).unwrap();
    let orchestrator = Arc::new(crate::Orchestrator::new(
        FakeExtractor::new(Behavior::Silent),
        output,
        &config.output,
    ));

    let err = start_api_server(orchestrator, Arc::new(config), std::future::pending())
        .await
        .unwrap_err();
    assert!(matches!(err, crate::Error::Io(_)));
}

#[tokio::test]
async fn test_cors_headers_on_cross_origin_post() {
    let app = TestApp::new(Behavior::Write {
        name: "clip.mp4",
        content: b"data",
    });

    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri(DOWNLOAD_PATH)
                .header("origin", "http://localhost:3000")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"url":"https://example.com/v"}"#))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_value(&response, "access-control-allow-origin"), Some("*"));
}

#[tokio::test]
async fn test_browser_preflight_is_answered() {
    let app = TestApp::new(Behavior::Silent);

    let response = app
        .send(
            Request::builder()
                .method("OPTIONS")
                .uri(DOWNLOAD_PATH)
                .header("origin", "http://localhost:3000")
                .header("access-control-request-method", "POST")
                .header("access-control-request-headers", "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_value(&response, "access-control-allow-origin"), Some("*"));
    let methods = header_value(&response, "access-control-allow-methods").unwrap();
    assert!(methods.contains("POST"));
    assert!(methods.contains("OPTIONS"));
    assert!(body_bytes(response).await.is_empty());
    assert_eq!(app.extractor.calls(), 0);
}

#[tokio::test]
async fn test_cors_disabled_omits_headers_outside_preflight() {
    let mut config = Config::default();
    config.server.cors_enabled = false;
    let app = TestApp::with_config(Behavior::Silent, config);

    let response = app
        .send(
            Request::builder()
                .uri("/health")
                .header("origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(header_value(&response, "access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new(Behavior::Silent);

    let response = app
        .send(
            Request::builder()
                .uri("/api/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
