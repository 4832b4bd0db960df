//! Third-party resolution API strategy

use super::ResolveStrategy;
use crate::config::ResolverConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Success value of the `code` field
const API_SUCCESS_CODE: i64 = 0;

/// Response envelope of the resolution API
///
/// `{"code": 0, "msg": "success", "data": {"play": "https://..."}}`
#[derive(Debug, Deserialize)]
struct ApiResponse {
    code: Option<i64>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<ApiData>,
}

#[derive(Debug, Deserialize)]
struct ApiData {
    #[serde(default)]
    play: Option<String>,
}

/// Asks the resolution API for the play URL of a page
///
/// Sends `GET <api_url>?url=<page url>` and reads `data.play` when `code == 0`.
#[derive(Debug, Clone)]
pub struct ResolutionApiStrategy {
    client: reqwest::Client,
    api_url: String,
    timeout: Duration,
}

impl ResolutionApiStrategy {
    /// Create the strategy from the resolver settings
    pub fn new(client: reqwest::Client, config: &ResolverConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            timeout: config.request_timeout,
        }
    }
}

#[async_trait]
impl ResolveStrategy for ResolutionApiStrategy {
    fn name(&self) -> &'static str {
        "resolution_api"
    }

    async fn resolve(&self, source_url: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("url", source_url)])
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;

        let body: ApiResponse = response.json().await?;

        if body.code != Some(API_SUCCESS_CODE) {
            debug!(
                code = ?body.code,
                msg = body.msg.as_deref().unwrap_or(""),
                "resolution API reported failure"
            );
            return Ok(None);
        }

        let play = body
            .data
            .and_then(|data| data.play)
            .ok_or_else(|| Error::Other("resolution API response has no data.play".into()))?;

        Ok(Some(play))
    }
}
