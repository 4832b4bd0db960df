//! Page URL → direct media URL resolution
//!
//! Resolution runs an ordered chain of [`ResolveStrategy`] implementations and stops
//! at the first one that yields a URL. Strategy failures are logged and treated as
//! "no result"; only the exhausted chain surfaces as [`Error::NotResolvable`].
//!
//! The default chain built by [`Resolver::from_config`] is:
//! 1. [`ResolutionApiStrategy`] - third-party resolution API
//! 2. [`PageScrapeStrategy`] - fetch the page and read `<video>` / page-state JSON

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::ResolvedMedia;
use async_trait::async_trait;
use tracing::{debug, info, warn};

mod api;
mod scrape;

pub use api::ResolutionApiStrategy;
pub use scrape::{PageScrapeStrategy, extract_media_url};

/// One way of turning a page URL into a direct media URL
///
/// Implementations return `Ok(None)` when they ran fine but found nothing, and
/// `Err` for anything unexpected (network failure, malformed payload). The
/// [`Resolver`] treats both the same way and moves on to the next strategy.
#[async_trait]
pub trait ResolveStrategy: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Try to resolve `source_url`
    async fn resolve(&self, source_url: &str) -> Result<Option<String>>;
}

/// Ordered strategy chain, first success wins
pub struct Resolver {
    strategies: Vec<Box<dyn ResolveStrategy>>,
}

impl Resolver {
    /// Create a resolver running `strategies` in the given order
    pub fn new(strategies: Vec<Box<dyn ResolveStrategy>>) -> Self {
        Self { strategies }
    }

    /// Build the default chain (API, then page scraping if enabled)
    pub fn from_config(config: &Config, client: reqwest::Client) -> Self {
        let mut strategies: Vec<Box<dyn ResolveStrategy>> = vec![Box::new(
            ResolutionApiStrategy::new(client.clone(), &config.resolver),
        )];

        if config.resolver.scrape_fallback {
            strategies.push(Box::new(PageScrapeStrategy::new(
                client,
                &config.platform,
                config.resolver.request_timeout,
            )));
        }

        Self::new(strategies)
    }

    /// Names of the configured strategies, in order
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Resolve a page URL to a direct media URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotResolvable`] when no strategy produced a non-empty URL.
    pub async fn resolve(&self, source_url: &str) -> Result<ResolvedMedia> {
        for strategy in &self.strategies {
            match strategy.resolve(source_url).await {
                Ok(Some(url)) if !url.trim().is_empty() => {
                    info!(
                        strategy = strategy.name(),
                        url = %source_url,
                        "resolved direct media URL"
                    );
                    return Ok(ResolvedMedia {
                        direct_url: url.trim().to_string(),
                        strategy: strategy.name(),
                    });
                }
                Ok(_) => {
                    debug!(
                        strategy = strategy.name(),
                        url = %source_url,
                        "strategy produced no result"
                    );
                }
                Err(e) => {
                    warn!(
                        strategy = strategy.name(),
                        url = %source_url,
                        error = %e,
                        "resolution strategy failed"
                    );
                }
            }
        }

        Err(Error::NotResolvable {
            url: source_url.to_string(),
        })
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("strategies", &self.strategy_names())
            .finish()
    }
}
