//! Page scraping strategy
//!
//! Fetches the platform page with a browser User-Agent and looks for, in order:
//! 1. a `<video>` element with a `src` attribute
//! 2. the `<script id="__NEXT_DATA__">` page-state blob, read at
//!    `props.pageProps.videoData.itemInfos.video.urls[0]`
//!
//! The markup and JSON shape belong to the platform and change without notice,
//! so this is a best-effort fallback behind the resolution API.

use super::ResolveStrategy;
use crate::config::PlatformConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use scraper::{Html, Selector};
use std::time::Duration;

/// Location of the video URL inside the page-state JSON
const PAGE_STATE_VIDEO_POINTER: &str = "/props/pageProps/videoData/itemInfos/video/urls/0";

/// Scrapes the page itself for a direct media URL
#[derive(Debug, Clone)]
pub struct PageScrapeStrategy {
    client: reqwest::Client,
    user_agent: String,
    timeout: Duration,
}

impl PageScrapeStrategy {
    /// Create the strategy for the given platform
    pub fn new(client: reqwest::Client, platform: &PlatformConfig, timeout: Duration) -> Self {
        Self {
            client,
            user_agent: platform.user_agent.clone(),
            timeout,
        }
    }
}

#[async_trait]
impl ResolveStrategy for PageScrapeStrategy {
    fn name(&self) -> &'static str {
        "page_scrape"
    }

    async fn resolve(&self, source_url: &str) -> Result<Option<String>> {
        let html = self
            .client
            .get(source_url)
            .header(USER_AGENT, self.user_agent.as_str())
            .timeout(self.timeout)
            .send()
            .await?
            .text()
            .await?;

        extract_media_url(&html)
    }
}

/// Find a direct media URL in page markup.
///
/// Returns `Ok(None)` when the page has neither a usable `<video>` nor a
/// page-state script, and `Err` when the page-state script exists but is not
/// valid JSON or lacks the video URL.
pub fn extract_media_url(html: &str) -> Result<Option<String>> {
    let video_sel = selector("video")?;
    let state_sel = selector("script#__NEXT_DATA__")?;

    let document = Html::parse_document(html);

    // A `<video>` without a usable src does not end the search; later videos and
    // the page-state script are still tried.
    if let Some(src) = document
        .select(&video_sel)
        .filter_map(|video| video.value().attr("src"))
        .map(str::trim)
        .find(|src| !src.is_empty())
    {
        return Ok(Some(src.to_string()));
    }

    let Some(script) = document.select(&state_sel).next() else {
        return Ok(None);
    };

    let raw: String = script.text().collect();
    let state: serde_json::Value = serde_json::from_str(&raw)?;
    let url = state
        .pointer(PAGE_STATE_VIDEO_POINTER)
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            Error::Other(format!(
                "page state JSON has no string at {PAGE_STATE_VIDEO_POINTER}"
            ))
        })?;

    Ok(Some(url.to_string()))
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Other(format!("invalid selector '{css}': {e:?}")))
}
