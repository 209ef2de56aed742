//! Configuration types for media-dl
//!
//! Configuration is read from the process environment (after loading an
//! optional `.env` file). `MEDIA_DL_CONFIG` may name a JSON file that
//! supplies the base values, which individual variables then override.
//! Every setting has a default, so an empty environment yields a working
//! service on port 8080.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};
use utoipa::ToSchema;

/// HTTP listener and surface toggles
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Interface to bind to (default: 0.0.0.0)
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Listening port (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Wrap the router in a permissive CORS layer (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Expose the output directory read-only under `/downloads` (default: true)
    #[serde(default = "default_true")]
    pub serve_downloads: bool,
}

impl ServerConfig {
    /// Socket address the API server binds to
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: true,
            serve_downloads: true,
        }
    }
}

/// How extraction output is laid out inside the output directory
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum OutputLayout {
    /// Each request writes into its own scratch subdirectory
    #[default]
    PerRequest,
    /// All requests write into the flat output directory, one at a time
    Shared,
}

impl FromStr for OutputLayout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per-request" | "per_request" | "isolated" => Ok(Self::PerRequest),
            "shared" | "flat" => Ok(Self::Shared),
            other => Err(Error::Config {
                message: format!("unknown output layout '{other}' (expected 'per-request' or 'shared')"),
                key: Some(ENV_OUTPUT_LAYOUT.to_string()),
            }),
        }
    }
}

/// Bounded poll that waits for an artifact's size to stop changing
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettleConfig {
    /// Delay between two size readings (default: 200ms)
    #[serde(default = "default_settle_poll", deserialize_with = "deserialize_millis")]
    pub poll_interval: Duration,

    /// Upper bound on the total time spent polling (default: 2s)
    #[serde(default = "default_settle_max", deserialize_with = "deserialize_millis")]
    pub max_wait: Duration,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_settle_poll(),
            max_wait: default_settle_max(),
        }
    }
}

/// Output directory settings
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory artifacts are written to (default: "downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Per-request isolation or a shared flat directory
    #[serde(default)]
    pub layout: OutputLayout,

    /// Size-stability polling after the tool exits
    #[serde(default)]
    pub settle: SettleConfig,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            layout: OutputLayout::default(),
            settle: SettleConfig::default(),
        }
    }
}

/// yt-dlp invocation settings
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractorConfig {
    /// Path to the yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub binary_path: Option<PathBuf>,

    /// Container every download is merged into (default: "mp4")
    #[serde(default = "default_merge_format")]
    pub merge_output_format: String,

    /// Send browser-like User-Agent and Referer headers (default: true)
    #[serde(default = "default_true")]
    pub impersonate: bool,

    /// User-Agent sent when impersonating
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Referer sent when impersonating
    #[serde(default = "default_referer")]
    pub referer: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            binary_path: None,
            merge_output_format: default_merge_format(),
            impersonate: true,
            user_agent: default_user_agent(),
            referer: default_referer(),
        }
    }
}

/// Main configuration for the media-dl service
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Output directory settings
    #[serde(default)]
    pub output: OutputConfig,

    /// External tool settings
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

const ENV_CONFIG_FILE: &str = "MEDIA_DL_CONFIG";
const ENV_PORT: &str = "PORT";
const ENV_HOST: &str = "MEDIA_DL_BIND_HOST";
const ENV_CORS: &str = "MEDIA_DL_CORS";
const ENV_SERVE_DOWNLOADS: &str = "MEDIA_DL_SERVE_DOWNLOADS";
const ENV_DOWNLOAD_DIR: &str = "MEDIA_DL_DOWNLOAD_DIR";
const ENV_OUTPUT_LAYOUT: &str = "MEDIA_DL_OUTPUT_LAYOUT";
const ENV_SETTLE_POLL_MS: &str = "MEDIA_DL_SETTLE_POLL_MS";
const ENV_SETTLE_MAX_MS: &str = "MEDIA_DL_SETTLE_MAX_MS";
const ENV_EXTRACTOR_PATH: &str = "MEDIA_DL_EXTRACTOR_PATH";
const ENV_IMPERSONATE: &str = "MEDIA_DL_IMPERSONATE";
const ENV_USER_AGENT: &str = "MEDIA_DL_USER_AGENT";
const ENV_REFERER: &str = "MEDIA_DL_REFERER";

impl Config {
    /// Load configuration from environment variables
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read a JSON configuration file
    ///
    /// Omitted fields take their defaults; unknown fields are rejected.
    /// Settle durations are given in milliseconds.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read config file {}: {e}", path.display()),
            key: Some(ENV_CONFIG_FILE.to_string()),
        })?;
        serde_json::from_str(&content).map_err(|e| Error::Config {
            message: format!("invalid config file {}: {e}", path.display()),
            key: Some(ENV_CONFIG_FILE.to_string()),
        })
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// Empty values are treated as unset. If `MEDIA_DL_CONFIG` is set, the
    /// named file provides the values that unset keys fall back to.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = match get(ENV_CONFIG_FILE) {
            Some(path) => {
                tracing::debug!(path = %path, "loading config file");
                Config::from_file(&path)?
            }
            None => Config::default(),
        };

        let server = ServerConfig {
            host: parse_or(get(ENV_HOST), ENV_HOST, defaults.server.host)?,
            port: parse_or(get(ENV_PORT), ENV_PORT, defaults.server.port)?,
            cors_enabled: bool_or(get(ENV_CORS), ENV_CORS, defaults.server.cors_enabled)?,
            serve_downloads: bool_or(
                get(ENV_SERVE_DOWNLOADS),
                ENV_SERVE_DOWNLOADS,
                defaults.server.serve_downloads,
            )?,
        };

        let settle = SettleConfig {
            poll_interval: get(ENV_SETTLE_POLL_MS)
                .map(|v| parse_value::<u64>(&v, ENV_SETTLE_POLL_MS).map(Duration::from_millis))
                .transpose()?
                .unwrap_or(defaults.output.settle.poll_interval),
            max_wait: get(ENV_SETTLE_MAX_MS)
                .map(|v| parse_value::<u64>(&v, ENV_SETTLE_MAX_MS).map(Duration::from_millis))
                .transpose()?
                .unwrap_or(defaults.output.settle.max_wait),
        };

        let output = OutputConfig {
            download_dir: get(ENV_DOWNLOAD_DIR)
                .map(PathBuf::from)
                .unwrap_or(defaults.output.download_dir),
            layout: get(ENV_OUTPUT_LAYOUT)
                .map(|v| v.parse::<OutputLayout>())
                .transpose()?
                .unwrap_or(defaults.output.layout),
            settle,
        };

        let extractor = ExtractorConfig {
            binary_path: get(ENV_EXTRACTOR_PATH)
                .map(PathBuf::from)
                .or(defaults.extractor.binary_path),
            merge_output_format: defaults.extractor.merge_output_format,
            impersonate: bool_or(
                get(ENV_IMPERSONATE),
                ENV_IMPERSONATE,
                defaults.extractor.impersonate,
            )?,
            user_agent: get(ENV_USER_AGENT).unwrap_or(defaults.extractor.user_agent),
            referer: get(ENV_REFERER).unwrap_or(defaults.extractor.referer),
        };

        Ok(Self {
            server,
            output,
            extractor,
        })
    }
}

fn parse_value<T: FromStr>(value: &str, key: &str) -> Result<T> {
    value.trim().parse().map_err(|_| Error::Config {
        message: format!("invalid value '{value}' for {key}"),
        key: Some(key.to_string()),
    })
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> Result<T> {
    match value {
        Some(v) => parse_value(&v, key),
        None => Ok(default),
    }
}

fn bool_or(value: Option<String>, key: &str, default: bool) -> Result<bool> {
    let Some(value) = value else {
        return Ok(default);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config {
            message: format!("invalid boolean '{value}' for {key}"),
            key: Some(key.to_string()),
        }),
    }
}

// Default value functions
fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_settle_poll() -> Duration {
    Duration::from_millis(200)
}

fn default_settle_max() -> Duration {
    Duration::from_secs(2)
}

fn default_merge_format() -> String {
    "mp4".into()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/87.0.4280.66 Safari/537.36".into()
}

fn default_referer() -> String {
    "https://www.youtube.com/".into()
}

fn deserialize_millis<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}
