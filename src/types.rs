//! Core types passed between the API, the relay and the resolver

use std::path::PathBuf;

/// MIME type of every asset served by the relay
pub const VIDEO_MIME_TYPE: &str = "video/mp4";

/// A single download request, one per HTTP call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadRequest {
    /// The platform page URL submitted by the user
    pub source_url: String,
}

impl DownloadRequest {
    /// Create a request for the given page URL
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
        }
    }
}

/// A direct media URL produced by the resolver
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedMedia {
    /// URL pointing at the video bytes (not yet normalized)
    pub direct_url: String,

    /// Name of the strategy that produced the URL
    pub strategy: &'static str,
}

/// A video persisted to the download directory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedAsset {
    /// Final location on disk
    pub file_path: PathBuf,

    /// Sanitized filename offered to the client
    pub file_name: String,

    /// MIME type of the asset (always `video/mp4`)
    pub mime_type: &'static str,

    /// Number of bytes written
    pub size_bytes: u64,
}
