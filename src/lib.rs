//! # tiktok-dl
//!
//! Resolve TikTok page URLs to their direct video URL and relay the video to the
//! caller as a file download.
//!
//! The crate is split into three layers:
//! - **Resolution** ([`resolver`]) - an ordered chain of strategies (third-party
//!   resolution API, then page scraping) that turns a page URL into a media URL
//! - **Relay** ([`relay`]) - validates the request, runs the chain, and streams the
//!   media into the download directory
//! - **HTTP API** ([`api`]) - a small axum service exposing the relay as
//!   `POST /api/download`, plus the front end
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tiktok_dl::{Config, DownloadRequest, Relay};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let relay = Relay::new(Arc::new(Config::default()))?;
//!     relay.prepare().await?;
//!
//!     let asset = relay
//!         .handle(&DownloadRequest::new("https://www.tiktok.com/@user/video/123456789"))
//!         .await?;
//!     println!("saved {} ({} bytes)", asset.file_name, asset.size_bytes);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Download relay: validation, resolution, media fetch
pub mod relay;
/// Direct media URL resolution strategies
pub mod resolver;
/// Request and result types
pub mod types;
/// URL and filename helpers
pub mod utils;

pub use config::Config;
pub use error::{ApiError, Error, Result, ToHttpStatus};
pub use relay::Relay;
pub use resolver::{ResolveStrategy, Resolver};
pub use types::{DownloadRequest, ResolvedMedia, SavedAsset};

/// Wait for a process shutdown signal.
///
/// On unix this is SIGTERM or SIGINT, elsewhere Ctrl+C. Pass it to
/// [`api::start_api_server`] for graceful shutdown.
pub async fn shutdown_signal() {
    wait_for_signal().await;
    tracing::info!("shutdown signal received, draining in-flight requests");
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in restricted environments (containers, tests)
    match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM signal"),
                _ = sigint.recv() => tracing::info!("Received SIGINT signal (Ctrl+C)"),
            }
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            sigint.recv().await;
            tracing::info!("Received SIGINT signal (Ctrl+C)");
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM signal");
        }
        (Err(e), Err(_)) => {
            tracing::error!(error = %e, "Could not register any signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C signal"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C signal"),
    }
}
