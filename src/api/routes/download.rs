//! Download handler.

use super::DownloadForm;
use crate::api::AppState;
use crate::error::{Error, ToHttpStatus};
use crate::relay::{CHUNK_SIZE, FileGuard};
use crate::types::{DownloadRequest, SavedAsset};
use axum::{
    body::Body,
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use tokio_util::io::ReaderStream;

/// POST /api/download - Resolve a page URL and return the video
#[utoipa::path(
    post,
    path = "/api/download",
    tag = "download",
    request_body(content = DownloadForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "The video as a `video/mp4` attachment"),
        (status = 400, description = "Invalid or unresolvable URL", body = crate::error::ApiError),
        (status = 500, description = "Upstream, network or I/O failure", body = crate::error::ApiError)
    )
)]
pub async fn download_video(State(state): State<AppState>, form: DownloadForm) -> Response {
    let request = DownloadRequest::new(form.url.unwrap_or_default());

    match state.relay.handle(&request).await {
        Ok(asset) => match serve_asset(asset, state.config.download.keep_files).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(url = %request.source_url, error = %e, "failed to serve saved video");
                e.into_response()
            }
        },
        Err(e) => {
            if e.status_code() >= 500 {
                tracing::error!(url = %request.source_url, error = %e, "download failed");
            } else {
                tracing::info!(url = %request.source_url, error = %e, "download rejected");
            }
            e.into_response()
        }
    }
}

/// Stream a saved video back as an attachment.
///
/// Unless files are kept, the file is removed once the body stream is dropped.
async fn serve_asset(asset: SavedAsset, keep_files: bool) -> Result<Response, Error> {
    let guard = (!keep_files).then(|| FileGuard::new(asset.file_path.clone()));
    let file = tokio::fs::File::open(&asset.file_path).await?;

    let stream = ReaderStream::with_capacity(file, CHUNK_SIZE).map(move |chunk| {
        let _guard = &guard;
        chunk
    });

    let headers = [
        (CONTENT_TYPE, asset.mime_type.to_string()),
        (
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", asset.file_name),
        ),
        (CONTENT_LENGTH, asset.size_bytes.to_string()),
    ];

    Ok((headers, Body::from_stream(stream)).into_response())
}
