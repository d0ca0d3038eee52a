//! Browser-rendered fetch strategy
//!
//! For listings that only materialize their cards through client-side
//! script: navigate, scroll a fixed number of rounds to trigger lazy
//! loading, then wait for a known card selector before reading the markup.

use crate::config::PacingConfig;
use crate::crawler::fetcher::{PageFetcher, RawListingPage, SelectorStrategy};
use crate::render::{RenderBackend, RenderError};
use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

/// Interval between selector probes while waiting for cards
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Render timing knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderPlan {
    pub scroll_rounds: u32,
    pub scroll_delay: Duration,
    /// Total budget for the card wait, shared by all candidates
    pub wait_timeout: Duration,
    pub poll_interval: Duration,
}

impl RenderPlan {
    pub fn from_pacing(pacing: &PacingConfig) -> Self {
        Self {
            scroll_rounds: pacing.scroll_rounds,
            scroll_delay: Duration::from_millis(pacing.scroll_delay_ms),
            wait_timeout: Duration::from_secs(pacing.render_timeout_secs),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Fetches listing pages through a rendering backend
pub struct RenderedFetcher<B: RenderBackend> {
    backend: B,
    plan: RenderPlan,
}

impl<B: RenderBackend> RenderedFetcher<B> {
    pub fn new(backend: B, plan: RenderPlan) -> Self {
        Self { backend, plan }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    async fn render(&self, url: &str) -> Result<RawListingPage, RenderError> {
        self.backend.navigate(url).await?;

        for round in 1..=self.plan.scroll_rounds {
            self.backend.scroll_to_bottom().await?;
            tracing::debug!("Scroll round {}/{}", round, self.plan.scroll_rounds);
            tokio::time::sleep(self.plan.scroll_delay).await;
        }

        let strategy = self.wait_for_cards().await?;
        let markup = self.backend.page_source().await?;

        Ok(RawListingPage {
            url: url.to_string(),
            markup,
            strategy,
        })
    }

    /// Polls the candidate selectors, strongest first, until one matches or
    /// the shared deadline passes
    ///
    /// Falls back to the generic article rule on timeout. A zero timeout
    /// probes each candidate exactly once.
    async fn wait_for_cards(&self) -> Result<SelectorStrategy, RenderError> {
        let deadline = Instant::now() + self.plan.wait_timeout;

        loop {
            for candidate in SelectorStrategy::WAIT_CANDIDATES {
                if self.backend.has_element(candidate.selector()).await? {
                    tracing::debug!("Cards matched {}", candidate);
                    return Ok(candidate);
                }
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let pause = self.plan.poll_interval.min(deadline - now);
            tokio::time::sleep(pause).await;
        }

        tracing::warn!(
            "No known card selector appeared within {:?}, falling back to {}",
            self.plan.wait_timeout,
            SelectorStrategy::GenericArticle
        );
        Ok(SelectorStrategy::GenericArticle)
    }
}

#[async_trait]
impl<B: RenderBackend> PageFetcher for RenderedFetcher<B> {
    async fn fetch(&self, url: &str) -> FetchResult<RawListingPage> {
        self.render(url).await.map_err(|source| FetchError::Render {
            url: url.to_string(),
            source,
        })
    }

    async fn shutdown(&mut self) -> Result<(), RenderError> {
        self.backend.close().await
    }

    fn name(&self) -> &'static str {
        "rendered"
    }
}
