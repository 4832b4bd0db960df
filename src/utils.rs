//! Utility functions for URL normalization and filename handling

use regex::Regex;
use std::sync::LazyLock;

/// Extension of every derived filename
const VIDEO_EXTENSION: &str = "mp4";

/// Numeric video id in a page URL, e.g. `/@user/video/7234567890123456789`
#[allow(clippy::expect_used)]
static VIDEO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/video/(\d+)").expect("video id pattern is valid"));

/// Characters that survive filename sanitizing
#[allow(clippy::expect_used)]
static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("filename pattern is valid"));

/// Turn a resolved media URL into an absolute URL.
///
/// - `//host/path` becomes `https://host/path`
/// - `/path` is joined onto the platform `origin`
/// - anything else is returned unchanged
///
/// # Examples
///
/// ```
/// use tiktok_dl::utils::normalize_media_url;
///
/// assert_eq!(
///     normalize_media_url("//cdn.example.com/x.mp4", "https://www.tiktok.com"),
///     "https://cdn.example.com/x.mp4"
/// );
/// assert_eq!(
///     normalize_media_url("/aweme/v1/play/?id=1", "https://www.tiktok.com"),
///     "https://www.tiktok.com/aweme/v1/play/?id=1"
/// );
/// ```
#[must_use]
pub fn normalize_media_url(url: &str, origin: &str) -> String {
    if url.starts_with("//") {
        format!("https:{url}")
    } else if url.starts_with('/') {
        format!("{}{}", origin.trim_end_matches('/'), url)
    } else {
        url.to_string()
    }
}

/// Extract the numeric video id from a page URL, if present.
#[must_use]
pub fn extract_video_id(source_url: &str) -> Option<&str> {
    VIDEO_ID_RE
        .captures(source_url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Build the download filename for a page URL.
///
/// Produces `<platform>_<id>.mp4`, or `<platform>_video.mp4` when the URL carries
/// no `/video/<digits>` segment. The result is always sanitized.
///
/// # Examples
///
/// ```
/// use tiktok_dl::utils::derive_filename;
///
/// assert_eq!(
///     derive_filename("https://www.tiktok.com/@u/video/123456789/", "tiktok"),
///     "tiktok_123456789.mp4"
/// );
/// assert_eq!(derive_filename("https://vm.tiktok.com/ZMabc/", "tiktok"), "tiktok_video.mp4");
/// ```
#[must_use]
pub fn derive_filename(source_url: &str, platform: &str) -> String {
    let id = extract_video_id(source_url).unwrap_or("video");
    let name = sanitize_filename(&format!("{platform}_{id}.{VIDEO_EXTENSION}"));
    if name.is_empty() {
        // A platform name made only of unsafe characters
        format!("video.{VIDEO_EXTENSION}")
    } else {
        name
    }
}

/// Make a filename safe to join onto the download directory.
///
/// Path separators and whitespace become `_`, every character outside
/// `[A-Za-z0-9._-]` is dropped, and leading/trailing `.` and `_` are trimmed, so
/// the result can never name a parent directory or a hidden file.
///
/// # Examples
///
/// ```
/// use tiktok_dl::utils::sanitize_filename;
///
/// assert_eq!(sanitize_filename("../../etc/passwd"), "etc_passwd");
/// assert_eq!(sanitize_filename("my video.mp4"), "my_video.mp4");
/// ```
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let mut spaced = String::with_capacity(name.len());
    for c in name.chars() {
        if c == '/' || c == '\\' {
            spaced.push(' ');
        } else {
            spaced.push(c);
        }
    }

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(&joined, "");
    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}
