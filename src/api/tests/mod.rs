use super::*;
use crate::Config;
use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};


const PAGE_URL: &str = "https://www.tiktok.com/@u/video/42";

/// Config whose resolution API lives on `server` and whose downloads land in `dir`
fn test_config(server: &MockServer, dir: &Path) -> Config {
    let mut config = Config::default();
    config.download.download_dir = dir.to_path_buf();
    config.platform.user_agent = "tiktok-dl-test/1.0".into();
    config.resolver.api_url = format!("{}/api/", server.uri());
    config.resolver.scrape_fallback = false;
    config
}

/// Build the router for `config`, with the download directory prepared
async fn create_test_app(config: Config) -> Router {
    let config = Arc::new(config);
    let relay = Arc::new(Relay::new(config.clone()).unwrap());
    relay.prepare().await.unwrap();
    create_router(relay, config)
}

/// Stub the resolution API so `page_url` resolves to `play`
async fn mount_api_play(server: &MockServer, page_url: &str, play: &str) {
    Mock::given(method("GET"))
        .and(path("/api/"))
        .and(query_param("url", page_url))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 0,
            "msg": "success",
            "data": {"play": play}
        })))
        .mount(server)
        .await;
}

fn form_request(body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/download")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.into()))
        .unwrap()
}

fn multipart_request(url: &str) -> Request<Body> {
    let boundary = "tiktokdlboundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"url\"\r\n\r\n\
         {url}\r\n\
         --{boundary}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri("/api/download")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn files_in(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect()
}

#[tokio::test]
async fn test_api_server_serves_and_shuts_down() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let config = Arc::new(test_config(&server, temp_dir.path()));
    let relay = Arc::new(Relay::new(config.clone()).unwrap());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let handle = tokio::spawn(serve(listener, relay, config, async {
        rx.await.ok();
    }));

    let response = reqwest::get(format!("http://{address}/health")).await.unwrap();
    assert_eq!(response.status(), 200);

    tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_start_api_server_reports_bind_failure() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let mut config = test_config(&server, temp_dir.path());
    config.server.api.bind_address = occupied.local_addr().unwrap();
    let config = Arc::new(config);
    let relay = Arc::new(Relay::new(config.clone()).unwrap());

    let result = start_api_server(relay, config, async {}).await;
    assert!(matches!(result, Err(crate::Error::Io(_))));
}

#[tokio::test]
async fn test_cors_enabled() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(test_config(&server, temp_dir.path())).await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers().contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let mut config = test_config(&server, temp_dir.path());
    config.server.api.cors_enabled = false;
    let app = create_test_app(config).await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_cors_specific_origin() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let mut config = test_config(&server, temp_dir.path());
    config.server.api.cors_origins = vec!["http://allowed.example".to_string()];
    let app = create_test_app(config).await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://allowed.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "http://allowed.example"
    );
}

#[tokio::test]
async fn test_panic_becomes_json_500() {
    let response = handle_panic(Box::new("boom"));
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["code"], "internal_error");
    assert_eq!(json["error"], "boom");
}
