//! Pipeline orchestration
//!
//! One run processes one category query from start to finish:
//! - Resolve the bot author (lookup only under dry-run)
//! - Build the listing URL and fetch it
//! - Extract cards one at a time, pausing after each
//! - Publish each record in extraction order, pausing after each
//! - Report the outcome counts
//!
//! Everything is sequential. A failed fetch ends the run with zero
//! products; a failed card or publish only affects that item.

use crate::config::Config;
use crate::crawler::extractor::{locate_cards, CardExtractor, ExtractContext};
use crate::crawler::fetcher::{PageFetcher, RawListingPage, StaticFetcher};
use crate::crawler::pacing::Pacer;
use crate::crawler::ProductRecord;
use crate::output::{Reporter, RunBanner, RunSummary};
use crate::publish::{AssetPublisher, BotIdentity, IdentityResolver};
use crate::state::RunState;
use crate::storage::ContentStore;
use crate::url::CategoryQuery;
use crate::{ConfigError, ShelfError};
use reqwest::Client;
use std::sync::Arc;
use url::Url;

/// Per-run switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Extract but never write to the content store
    pub dry_run: bool,
}

/// Sequences identity, fetch, extract and publish for one run
pub struct Orchestrator {
    fetcher: Box<dyn PageFetcher>,
    publisher: AssetPublisher,
    identity: IdentityResolver,
    pacer: Pacer,
    reporter: Reporter,
    context: ExtractContext,
    options: RunOptions,
    state: RunState,
}

impl Orchestrator {
    /// Creates an orchestrator for one run
    ///
    /// Listing pages are fetched statically through `client` until
    /// `with_fetcher` installs another strategy. Construction can fail, so it
    /// comes before any browser is launched.
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `store` - Destination content store
    /// * `client` - HTTP client used for listing pages and image downloads
    /// * `options` - Per-run switches
    ///
    /// # Returns
    ///
    /// * `Ok(Orchestrator)` - Ready to run
    /// * `Err(ShelfError)` - The configured origin is not a valid URL
    pub fn new(
        config: &Config,
        store: Arc<dyn ContentStore>,
        client: Client,
        options: RunOptions,
    ) -> Result<Self, ShelfError> {
        let origin = Url::parse(&config.source.origin)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", config.source.origin, e)))?;

        Ok(Self {
            fetcher: Box::new(StaticFetcher::new(client.clone())),
            publisher: AssetPublisher::new(store.clone(), client),
            identity: IdentityResolver::new(store, config.bot.clone()),
            pacer: Pacer::from_config(&config.pacing),
            reporter: Reporter::stdout(),
            context: ExtractContext {
                origin,
                site_name: config.source.site_name.clone(),
            },
            options,
            state: RunState::Idle,
        })
    }

    /// Replaces the listing fetch strategy; owned for the run
    pub fn with_fetcher(mut self, fetcher: Box<dyn PageFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn fetcher_name(&self) -> &'static str {
        self.fetcher.name()
    }

    /// Replaces the console reporter
    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Runs the pipeline for `query`, then releases the fetcher
    ///
    /// The fetcher is shut down whether or not the run succeeded.
    pub async fn run_once(mut self, query: &CategoryQuery) -> Result<RunSummary, ShelfError> {
        let result = self.run(query).await;
        self.shutdown().await;
        result
    }

    /// Runs the pipeline for `query`
    ///
    /// Only configuration problems and a failed bot bootstrap abort the run.
    /// A failed fetch is reported as "no products found" with an empty
    /// summary.
    pub async fn run(&mut self, query: &CategoryQuery) -> Result<RunSummary, ShelfError> {
        self.reporter.banner(&RunBanner {
            dry_run: self.options.dry_run,
            fetcher: self.fetcher.name(),
            category: &query.category,
            limit: query.limit,
        });

        let bot = self.resolve_bot().await?;
        self.state.advance(RunState::IdentityResolved)?;

        let url = query.listing_url(self.context.origin.as_str());
        tracing::info!("Fetching listing {}", url);
        self.reporter.fetching(&url);
        self.state.advance(RunState::Fetching)?;

        let page = match self.fetcher.fetch(&url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!("Listing fetch failed: {}", e);
                self.reporter.fetch_failed(&e);
                self.reporter.no_products();
                self.state.advance(RunState::Reporting)?;
                self.state.advance(RunState::Done)?;
                return Ok(RunSummary::new());
            }
        };

        self.state.advance(RunState::Extracting)?;
        let records = self.extract(&page, query.limit).await;
        tracing::info!("Extracted {} products", records.len());

        self.state.advance(RunState::Publishing)?;
        let summary = if records.is_empty() {
            RunSummary::new()
        } else {
            self.publish_all(&records, bot.as_ref()).await
        };

        self.state.advance(RunState::Reporting)?;
        if records.is_empty() {
            self.reporter.no_products();
        } else {
            self.reporter.summary(&summary);
        }
        tracing::info!(
            "Run finished: {} succeeded, {} failed",
            summary.succeeded,
            summary.failed
        );
        self.state.advance(RunState::Done)?;

        Ok(summary)
    }

    /// Releases the fetcher's resources; failures are logged only
    pub async fn shutdown(&mut self) {
        if let Err(e) = self.fetcher.shutdown().await {
            tracing::warn!("Failed to shut down {} fetcher: {}", self.fetcher.name(), e);
        }
    }

    async fn resolve_bot(&mut self) -> Result<Option<BotIdentity>, ShelfError> {
        let bot = if self.options.dry_run {
            self.identity.lookup().await?
        } else {
            Some(self.identity.resolve().await?)
        };

        match &bot {
            Some(bot) => self.reporter.bot_ready(&bot.display_name, &bot.id),
            None => {
                tracing::info!("Dry run: bot profile not found, skipping creation");
                self.reporter
                    .bot_missing_dry_run(self.identity.display_name());
            }
        }

        Ok(bot)
    }

    async fn extract(&mut self, page: &RawListingPage, limit: usize) -> Vec<ProductRecord> {
        let cards = locate_cards(page, limit);
        let total = cards.len();
        let mut records = Vec::with_capacity(total);

        for (index, result) in CardExtractor::new(cards, self.context.clone()) {
            self.reporter.card_progress(index + 1, total);
            match result {
                Ok(record) => {
                    self.reporter.card_extracted(&record);
                    records.push(record);
                }
                Err(e) => {
                    tracing::warn!("Skipping card {}: {}", index + 1, e);
                    self.reporter.card_skipped(&e);
                }
            }
            self.pacer.after_card().await;
        }

        records
    }

    async fn publish_all(
        &mut self,
        records: &[ProductRecord],
        bot: Option<&BotIdentity>,
    ) -> RunSummary {
        let mut summary = RunSummary::new();
        self.reporter.publishing(records.len());

        for record in records {
            if self.options.dry_run {
                self.reporter.dry_run_post(record);
                summary.record_success();
            } else {
                let post_id = match bot {
                    Some(bot) => self.publisher.publish(record, bot).await,
                    None => None,
                };
                match post_id {
                    Some(id) => {
                        self.reporter.post_created(&id);
                        summary.record_success();
                    }
                    None => {
                        self.reporter.post_failed(record);
                        summary.record_failure();
                    }
                }
            }
            self.pacer.after_publish().await;
        }

        summary
    }
}
