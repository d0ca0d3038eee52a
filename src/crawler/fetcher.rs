//! Listing page fetching
//!
//! Two interchangeable strategies sit behind the `PageFetcher` trait:
//! - `StaticFetcher`: one HTTP GET with browser-like headers
//! - `RenderedFetcher` (see `rendered.rs`): render, scroll, wait for cards
//!
//! Neither retries and neither caches. Any transport failure or non-2xx
//! status is a `FetchError`.

use crate::config::SourceConfig;
use crate::render::RenderError;
use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION};
use reqwest::Client;
use std::fmt;
use std::time::Duration;

/// Markup rule believed to locate product cards in a listing page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorStrategy {
    /// Current card markup, tagged with a test identifier
    ProductCard,
    /// Older class-based card markup
    LegacyCard,
    /// Any article element; weakest known rule
    GenericArticle,
}

impl SelectorStrategy {
    /// Candidates probed while waiting for a rendered page, strongest first
    pub const WAIT_CANDIDATES: [SelectorStrategy; 2] =
        [SelectorStrategy::ProductCard, SelectorStrategy::LegacyCard];

    /// CSS selector for this strategy
    pub fn selector(&self) -> &'static str {
        match self {
            Self::ProductCard => r#"article[data-testid="product-card"]"#,
            Self::LegacyCard => ".cat_articleCard",
            Self::GenericArticle => "article",
        }
    }
}

impl fmt::Display for SelectorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

/// Raw markup of one listing page and the card rule expected to match it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawListingPage {
    pub url: String,
    pub markup: String,
    pub strategy: SelectorStrategy,
}

/// Retrieves listing pages
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the markup at `url`
    async fn fetch(&self, url: &str) -> FetchResult<RawListingPage>;

    /// Releases resources held by the fetcher (browser sessions)
    async fn shutdown(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    /// Short name used in logs and the run banner
    fn name(&self) -> &'static str;
}

/// Builds the shared HTTP client with browser-like headers
///
/// The client keeps connections alive and is reused for listing pages and
/// product images alike.
///
/// # Example
///
/// ```no_run
/// use shelf_drift::config::SourceConfig;
/// use shelf_drift::crawler::build_http_client;
///
/// let client = build_http_client(&SourceConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &SourceConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    if let Ok(language) = HeaderValue::from_str(&config.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, language);
    }
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(90))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Direct HTTP fetch strategy
pub struct StaticFetcher {
    client: Client,
}

impl StaticFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<RawListingPage> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let markup = response.text().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;

        tracing::debug!("Fetched {} ({} bytes)", url, markup.len());

        Ok(RawListingPage {
            url: url.to_string(),
            markup,
            strategy: SelectorStrategy::ProductCard,
        })
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
