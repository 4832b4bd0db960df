//! Configuration types for tiktok-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, path::PathBuf, time::Duration};

/// Browser User-Agent sent to the platform and the media host.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Main configuration for tiktok-dl
///
/// Built once at startup and shared read-only (behind an `Arc`) by the relay and
/// the API handlers.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Local storage settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// The source platform (name, domain, origin, headers)
    #[serde(default)]
    pub platform: PlatformConfig,

    /// Resolution strategy settings
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// API and external server integration
    #[serde(default)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Download directory
    pub fn download_dir(&self) -> &PathBuf {
        &self.download.download_dir
    }

    /// Load a configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults, so `{}` is a valid file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read config file {}: {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.platform.name.trim().is_empty() {
            return Err(Error::Config {
                message: "platform name must not be empty".into(),
                key: Some("platform.name".into()),
            });
        }
        if self.platform.domain.trim().is_empty() {
            return Err(Error::Config {
                message: "platform domain must not be empty".into(),
                key: Some("platform.domain".into()),
            });
        }
        match url::Url::parse(&self.platform.origin) {
            Ok(origin) if matches!(origin.scheme(), "http" | "https") => {}
            _ => {
                return Err(Error::Config {
                    message: format!(
                        "platform origin must be an absolute http(s) URL, got '{}'",
                        self.platform.origin
                    ),
                    key: Some("platform.origin".into()),
                });
            }
        }
        if url::Url::parse(&self.resolver.api_url).is_err() {
            return Err(Error::Config {
                message: format!(
                    "resolver api_url is not a valid URL: '{}'",
                    self.resolver.api_url
                ),
                key: Some("resolver.api_url".into()),
            });
        }
        if self.server.api.max_body_bytes == 0 {
            return Err(Error::Config {
                message: "max_body_bytes must be greater than zero".into(),
                key: Some("server.api.max_body_bytes".into()),
            });
        }
        Ok(())
    }
}

/// Local storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Download directory (default: "./downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Keep served files on disk after the response finished (default: false)
    ///
    /// When false, each saved video is removed as soon as its response body has
    /// been streamed to the client (or the client went away).
    #[serde(default)]
    pub keep_files: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            keep_files: false,
        }
    }
}

/// Source platform configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Short platform name, used as the filename prefix (default: "tiktok")
    #[serde(default = "default_platform_name")]
    pub name: String,

    /// Human-readable platform name used in error messages (default: "TikTok")
    #[serde(default = "default_display_name")]
    pub display_name: String,

    /// Substring every submitted page URL must contain (default: "tiktok.com")
    #[serde(default = "default_domain")]
    pub domain: String,

    /// Origin used for root-relative media URLs and the Referer header
    /// (default: "https://www.tiktok.com")
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Browser-like User-Agent for page and media requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl PlatformConfig {
    /// Referer value sent with media requests (the origin with a trailing slash)
    pub fn referer(&self) -> String {
        format!("{}/", self.origin.trim_end_matches('/'))
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            name: default_platform_name(),
            display_name: default_display_name(),
            domain: default_domain(),
            origin: default_origin(),
            user_agent: default_user_agent(),
        }
    }
}

/// Resolution strategy configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Third-party resolution API endpoint (default: "https://www.tikwm.com/api/")
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Timeout for resolution API and page requests (default: 30 seconds)
    #[serde(with = "duration_serde", default = "default_request_timeout")]
    pub request_timeout: Duration,

    /// Fall back to scraping the page when the API gives no result (default: true)
    #[serde(default = "default_true")]
    pub scrape_fallback: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout: default_request_timeout(),
            scrape_fallback: true,
        }
    }
}

/// API and external server integration configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:5000)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Maximum inbound request body size in bytes (default: 50 MiB)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_platform_name() -> String {
    "tiktok".into()
}

fn default_display_name() -> String {
    "TikTok".into()
}

fn default_domain() -> String {
    "tiktok.com".into()
}

fn default_origin() -> String {
    "https://www.tiktok.com".into()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}

fn default_api_url() -> String {
    "https://www.tikwm.com/api/".into()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

fn default_max_body_bytes() -> usize {
    50 * 1024 * 1024 // 50 MiB
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
