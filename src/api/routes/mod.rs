//! Route handlers for the REST API
//!
//! - `download`: `POST /api/download`
//! - `system`: front end, health, OpenAPI

use crate::error::ApiError;
use axum::{
    Json,
    extract::{FromRequest, Multipart, Request},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    Form,
};
use serde::{Deserialize, Serialize};

mod download;
mod system;

pub use download::*;
pub use system::*;

/// Form body for POST /api/download
///
/// Accepted as `application/x-www-form-urlencoded` or `multipart/form-data`
/// (the bundled front end posts a `FormData`).
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct DownloadForm {
    /// Platform page URL, e.g. `https://www.tiktok.com/@user/video/123456789`
    #[serde(default)]
    pub url: Option<String>,
}

#[axum::async_trait]
impl<S> FromRequest<S> for DownloadForm
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(form) = Form::<DownloadForm>::from_request(req, state)
                .await
                .map_err(|e| reject(e.status(), e.body_text()))?;
            return Ok(form);
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| reject(e.status(), e.body_text()))?;

        let mut form = DownloadForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| reject(e.status(), e.body_text()))?
        {
            if field.name() == Some("url") {
                let value = field
                    .text()
                    .await
                    .map_err(|e| reject(e.status(), e.body_text()))?;
                form.url = Some(value);
            }
        }
        Ok(form)
    }
}

fn reject(status: StatusCode, message: String) -> Response {
    (status, Json(ApiError::bad_request(message))).into_response()
}
