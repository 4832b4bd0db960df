//! End-to-end tests for the download service over a real listener
//!
//! The platform page, the resolution API and the media host are all served by a
//! wiremock server; the service itself runs on an ephemeral port.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{TEST_USER_AGENT, TestServer, files_in, mock_config, mount_api_failure, mount_api_play};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn download_via_resolution_api() {
    let upstream = MockServer::start().await;
    let page_url = format!("{}/@creator/video/7301", upstream.uri());
    mount_api_play(&upstream, &page_url, &format!("{}/media/v.mp4", upstream.uri())).await;
    Mock::given(method("GET"))
        .and(path("/media/v.mp4"))
        .and(header("user-agent", TEST_USER_AGENT))
        .and(header("referer", format!("{}/", upstream.uri()).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp4-bytes".to_vec()))
        .expect(1)
        .mount(&upstream)
        .await;

    let dir = TempDir::new().unwrap();
    let server = TestServer::spawn(mock_config(&upstream, dir.path())).await;

    let response = reqwest::Client::new()
        .post(server.url("/api/download"))
        .form(&[("url", page_url.as_str())])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "video/mp4");
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"tiktok_7301.mp4\""
    );
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"mp4-bytes");

    server.stop().await.unwrap();
    assert!(files_in(dir.path()).is_empty());
}

#[tokio::test]
async fn download_via_page_scrape_fallback() {
    let upstream = MockServer::start().await;
    mount_api_failure(&upstream).await;
    Mock::given(method("GET"))
        .and(path("/@creator/video/99"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><video src="/play/99.mp4"></video></body></html>"#,
        ))
        .expect(1)
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/play/99.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8; 20_000]))
        .expect(1)
        .mount(&upstream)
        .await;

    let dir = TempDir::new().unwrap();
    let server = TestServer::spawn(mock_config(&upstream, dir.path())).await;

    let response = reqwest::Client::new()
        .post(server.url("/api/download"))
        .form(&[("url", format!("{}/@creator/video/99", upstream.uri()))])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.bytes().await.unwrap().len(), 20_000);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn multipart_form_from_front_end() {
    let upstream = MockServer::start().await;
    let page_url = format!("{}/@creator/video/5", upstream.uri());
    mount_api_play(&upstream, &page_url, &format!("{}/media/5.mp4", upstream.uri())).await;
    Mock::given(method("GET"))
        .and(path("/media/5.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"five".to_vec()))
        .mount(&upstream)
        .await;

    let dir = TempDir::new().unwrap();
    let server = TestServer::spawn(mock_config(&upstream, dir.path())).await;

    // Hand-built multipart body, as a browser FormData post would send it
    let boundary = "----tiktokdlform";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"url\"\r\n\r\n{page_url}\r\n--{boundary}--\r\n"
    );
    let response = reqwest::Client::new()
        .post(server.url("/api/download"))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"five");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn unresolvable_page_returns_json_error() {
    let upstream = MockServer::start().await;
    mount_api_failure(&upstream).await;
    Mock::given(method("GET"))
        .and(path("/@creator/video/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>nothing</body></html>"))
        .mount(&upstream)
        .await;

    let dir = TempDir::new().unwrap();
    let server = TestServer::spawn(mock_config(&upstream, dir.path())).await;

    let response = reqwest::Client::new()
        .post(server.url("/api/download"))
        .form(&[("url", format!("{}/@creator/video/1", upstream.uri()))])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: tiktok_dl::ApiError = response.json().await.unwrap();
    assert_eq!(body.code, "not_resolvable");
    assert!(body.error.starts_with("could not extract video URL from"));

    server.stop().await.unwrap();
    assert!(files_in(dir.path()).is_empty());
}

#[tokio::test]
async fn concurrent_downloads_of_same_video() {
    let upstream = MockServer::start().await;
    let page_url = format!("{}/@creator/video/77", upstream.uri());
    mount_api_play(&upstream, &page_url, &format!("{}/media/77.mp4", upstream.uri())).await;
    Mock::given(method("GET"))
        .and(path("/media/77.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![9u8; 100_000]))
        .expect(4)
        .mount(&upstream)
        .await;

    let dir = TempDir::new().unwrap();
    let server = TestServer::spawn(mock_config(&upstream, dir.path())).await;
    let client = reqwest::Client::new();

    let requests = (0..4).map(|_| {
        let client = client.clone();
        let url = server.url("/api/download");
        let page_url = page_url.clone();
        async move {
            let response = client
                .post(url)
                .form(&[("url", page_url)])
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), 200);
            response.bytes().await.unwrap()
        }
    });

    for body in futures::future::join_all(requests).await {
        assert_eq!(body.len(), 100_000);
        assert!(body.iter().all(|b| *b == 9));
    }

    server.stop().await.unwrap();
    assert!(files_in(dir.path()).is_empty());
}

#[tokio::test]
async fn stale_temp_files_are_swept_at_startup() {
    let upstream = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".tiktok_1.mp4.0123456789abcdef.part"), b"partial").unwrap();
    std::fs::write(dir.path().join("tiktok_2.mp4"), b"kept").unwrap();

    let server = TestServer::spawn(mock_config(&upstream, dir.path())).await;

    assert_eq!(files_in(dir.path()), vec!["tiktok_2.mp4".to_string()]);
    server.stop().await.unwrap();
}
