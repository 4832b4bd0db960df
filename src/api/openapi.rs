//! OpenAPI documentation and schema generation

use utoipa::OpenApi;

/// OpenAPI documentation for the tiktok-dl HTTP API
///
/// Served as JSON at `/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "tiktok-dl API",
        description = "Resolve a TikTok page URL and download the video as an attachment",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        crate::api::routes::download_video,
        crate::api::routes::index,
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(
        schemas(
            crate::api::routes::DownloadForm,
            crate::error::ApiError,
        )
    ),
    tags(
        (name = "download", description = "Video download"),
        (name = "system", description = "Front end, health and documentation")
    )
)]
pub struct ApiDoc;
