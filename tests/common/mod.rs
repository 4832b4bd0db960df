//! Common test utilities for tiktok-dl integration tests

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tiktok_dl::{Config, Relay, api};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// User agent used in tests (wiremock header matching splits on commas)
pub const TEST_USER_AGENT: &str = "tiktok-dl-test/1.0";

/// Config whose platform, resolution API and media host all point at `server`
pub fn mock_config(server: &MockServer, download_dir: &Path) -> Config {
    let mut config = Config::default();
    config.download.download_dir = download_dir.to_path_buf();
    config.platform.domain = "127.0.0.1".into();
    config.platform.origin = server.uri();
    config.platform.user_agent = TEST_USER_AGENT.into();
    config.resolver.api_url = format!("{}/api/", server.uri());
    config
}

/// A running API server on an ephemeral port
pub struct TestServer {
    pub address: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<tiktok_dl::Result<()>>,
}

impl TestServer {
    /// Bind to 127.0.0.1:0 and serve `config` in the background
    pub async fn spawn(config: Config) -> Self {
        let config = Arc::new(config);
        let relay = Arc::new(Relay::new(config.clone()).unwrap());
        relay.prepare().await.unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(api::serve(listener, relay, config, async {
            rx.await.ok();
        }));

        Self {
            address,
            shutdown: Some(tx),
            handle,
        }
    }

    /// URL for `path` on this server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.address, path)
    }

    /// Trigger graceful shutdown and wait for the server task
    pub async fn stop(mut self) -> tiktok_dl::Result<()> {
        if let Some(tx) = self.shutdown.take() {
            tx.send(()).ok();
        }
        self.handle.await.unwrap()
    }
}

/// Stub the resolution API so `page_url` resolves to `play`
pub async fn mount_api_play(server: &MockServer, page_url: &str, play: &str) {
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

/// Stub the resolution API to report failure for every URL
pub async fn mount_api_failure(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": -1,
            "msg": "Url parsing is failed! Please check url."
        })))
        .mount(server)
        .await;
}

/// Names of all entries in `dir`
pub fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
