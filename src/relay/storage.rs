//! Download directory handling
//!
//! Every fetch writes to its own hidden temp file, `.<file_name>.<hex>.part`, so
//! concurrent requests for the same video never write to the same path. Leftover
//! `.part` files (crash, killed process) are swept when the directory is prepared.

use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Suffix of in-flight and unserved temp files
pub(crate) const PART_SUFFIX: &str = ".part";

/// Create the download directory if needed and remove stale temp files.
///
/// Returns the number of stale files removed. Removal failures are logged and
/// skipped.
pub async fn prepare_download_dir(dir: &Path) -> Result<usize> {
    tokio::fs::create_dir_all(dir).await?;

    let mut removed = 0;
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !is_temp_file_name(&entry.file_name().to_string_lossy()) {
            continue;
        }

        let path = entry.path();
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(?path, "removed stale temp file");
                removed += 1;
            }
            Err(e) => {
                warn!(?path, error = %e, "failed to remove stale temp file");
            }
        }
    }

    if removed > 0 {
        info!(dir = ?dir, removed, "cleaned up stale temp files");
    }
    Ok(removed)
}

/// Unique temp path for `file_name` inside `dir`
pub fn temp_path_for(dir: &Path, file_name: &str) -> PathBuf {
    let suffix: u64 = rand::random();
    dir.join(format!(".{file_name}.{suffix:016x}{PART_SUFFIX}"))
}

fn is_temp_file_name(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(PART_SUFFIX)
}

/// Removes a file when dropped unless disarmed
///
/// Guards the temp file while a fetch is in progress, and travels with the
/// response body when served files are not kept.
#[derive(Debug)]
pub struct FileGuard {
    path: Option<PathBuf>,
}

impl FileGuard {
    /// Guard `path`
    pub fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// Keep the file; the guard becomes a no-op
    pub fn disarm(&mut self) {
        self.path = None;
    }
}

impl Drop for FileGuard {
    fn drop(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        match std::fs::remove_file(&path) {
            Ok(()) => debug!(?path, "removed file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(?path, error = %e, "failed to remove file"),
        }
    }
}
