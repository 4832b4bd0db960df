//! Download relay: validate → resolve → normalize → fetch → persist
//!
//! [`Relay::handle`] is the whole request flow behind `POST /api/download`. It owns
//! the shared HTTP client and the [`Resolver`] chain, and writes each video into
//! the download directory through a unique temp file.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::resolver::Resolver;
use crate::types::{DownloadRequest, SavedAsset, VIDEO_MIME_TYPE};
use crate::utils::{derive_filename, normalize_media_url};
use futures::StreamExt;
use reqwest::header::{ACCEPT, REFERER, USER_AGENT};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info};

pub mod storage;

pub use storage::{FileGuard, prepare_download_dir};

/// Write buffer size for streamed media bodies
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Connect timeout for every upstream request. The media transfer itself has no
/// overall timeout so large videos are never cut off.
const CONNECT_TIMEOUT_SECS: u64 = 15;

/// Fetches videos for page URLs and stores them locally
#[derive(Debug)]
pub struct Relay {
    config: Arc<Config>,
    client: reqwest::Client,
    resolver: Resolver,
}

impl Relay {
    /// Create a relay with the default resolver chain for `config`
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;
        let resolver = Resolver::from_config(&config, client.clone());
        Ok(Self::with_resolver(config, client, resolver))
    }

    /// Create a relay with a custom resolver chain
    pub fn with_resolver(config: Arc<Config>, client: reqwest::Client, resolver: Resolver) -> Self {
        Self {
            config,
            client,
            resolver,
        }
    }

    /// The resolver chain
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Create the download directory and sweep stale temp files.
    ///
    /// Call once at startup, before serving requests.
    pub async fn prepare(&self) -> Result<()> {
        prepare_download_dir(self.config.download_dir()).await?;
        Ok(())
    }

    /// Check that the request names a page on the configured platform.
    ///
    /// Returns the trimmed page URL.
    pub fn validate<'a>(&self, request: &'a DownloadRequest) -> Result<&'a str> {
        let source_url = request.source_url.trim();
        if source_url.is_empty() || !source_url.contains(&self.config.platform.domain) {
            return Err(Error::InvalidInput(format!(
                "Invalid {} URL",
                self.config.platform.display_name
            )));
        }
        Ok(source_url)
    }

    /// Run the full download flow for one request.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] - empty URL or foreign domain (no network call made)
    /// - [`Error::NotResolvable`] - no resolution strategy produced a URL
    /// - [`Error::FetchFailed`] - the media host answered with a non-2xx status
    /// - [`Error::Network`] / [`Error::Io`] - transport or disk failure
    pub async fn handle(&self, request: &DownloadRequest) -> Result<SavedAsset> {
        let source_url = self.validate(request)?;

        let media = self.resolver.resolve(source_url).await?;
        let direct_url = normalize_media_url(&media.direct_url, &self.config.platform.origin);
        let file_name = derive_filename(source_url, &self.config.platform.name);

        debug!(
            url = %source_url,
            direct_url = %direct_url,
            strategy = media.strategy,
            file_name = %file_name,
            "fetching media"
        );

        let dir = self.config.download_dir();
        let temp_path = storage::temp_path_for(dir, &file_name);
        let mut guard = FileGuard::new(temp_path.clone());
        let size_bytes = self.fetch_to_file(&direct_url, &temp_path).await?;

        let file_path = if self.config.download.keep_files {
            let final_path = dir.join(&file_name);
            tokio::fs::rename(&temp_path, &final_path).await?;
            final_path
        } else {
            // Served from its unique name and removed after the response.
            temp_path
        };
        guard.disarm();

        info!(
            url = %source_url,
            file_name = %file_name,
            size_bytes,
            "video saved"
        );

        Ok(SavedAsset {
            file_path,
            file_name,
            mime_type: VIDEO_MIME_TYPE,
            size_bytes,
        })
    }

    /// Stream `url` into a new file at `dest`, returning the number of bytes written.
    async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<u64> {
        let platform = &self.config.platform;
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, platform.user_agent.as_str())
            .header(REFERER, platform.referer())
            .header(ACCEPT, "*/*")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::FetchFailed {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let file = tokio::fs::File::create(dest).await?;
        let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
        let mut written: u64 = 0;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if chunk.is_empty() {
                continue;
            }
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        writer.flush().await?;
        writer.into_inner().sync_all().await?;

        Ok(written)
    }
}
