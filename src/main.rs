//! Shelf-Drift main entry point
//!
//! This is the command-line interface for the catalog scraping pipeline.

use anyhow::Context;
use clap::Parser;
use shelf_drift::config::{load_config_with_hash, load_dotenv, Config};
use shelf_drift::crawler::{
    build_http_client, Orchestrator, PageFetcher, RenderPlan, RenderedFetcher, RunOptions,
};
use shelf_drift::render::{ChromiumBackend, ChromiumOptions};
use shelf_drift::storage::open_store;
use shelf_drift::url::{CategoryQuery, ListingFilters, SortOrder};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Shelf-Drift: catalog listings in, bot posts out
///
/// Scrapes one category listing of the catalog, extracts up to `--limit`
/// products, and publishes each one as a post authored by the bot account.
#[derive(Parser, Debug)]
#[command(name = "shelf-drift")]
#[command(version)]
#[command(about = "Scrapes a catalog listing and publishes its products as posts", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Catalog category slug
    #[arg(long, default_value = "mode-femme")]
    category: String,

    /// Restrict the listing to one brand
    #[arg(long)]
    brand: Option<String>,

    /// Maximum number of products to process
    #[arg(long, default_value_t = 5)]
    limit: usize,

    /// Extract products without writing anything to the content store
    #[arg(long)]
    dry_run: bool,

    /// Only products added within the last DAYS days
    #[arg(long, value_name = "DAYS")]
    new_arrivals: Option<u32>,

    /// Minimum price
    #[arg(long)]
    price_from: Option<u32>,

    /// Maximum price
    #[arg(long)]
    price_to: Option<u32>,

    /// Listing sort order
    #[arg(long, value_enum)]
    order: Option<SortOrder>,

    /// Render the listing in a browser instead of fetching it directly
    #[arg(long)]
    render: bool,

    /// Show the browser window while rendering
    #[arg(long, requires = "render")]
    show_browser: bool,

    /// Chrome/Chromium executable, overriding the configuration
    #[arg(long, value_name = "PATH", requires = "render")]
    chrome_path: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn query(&self) -> CategoryQuery {
        let mut filters = ListingFilters::new();
        if let Some(days) = self.new_arrivals {
            filters = filters.new_arrivals(days);
        }
        if let Some(price) = self.price_from {
            filters = filters.price_from(price);
        }
        if let Some(price) = self.price_to {
            filters = filters.price_to(price);
        }
        if let Some(order) = self.order {
            filters = filters.order(order);
        }
        if let Some(brand) = &self.brand {
            filters = filters.brand(brand.clone());
        }

        CategoryQuery::new(self.category.clone())
            .with_filters(filters)
            .with_limit(self.limit)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    load_dotenv();

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    // Credentials and store setup fail here, before any network activity
    let store = open_store(&config.store).context("Failed to open content store")?;
    let client = build_http_client(&config.source).context("Failed to build HTTP client")?;

    let options = RunOptions {
        dry_run: cli.dry_run,
    };
    let mut orchestrator = Orchestrator::new(&config, store, client, options)?;

    // The browser is only launched once nothing else can fail before the run
    if cli.render {
        orchestrator = orchestrator.with_fetcher(launch_rendered_fetcher(&cli, &config).await?);
    }
    let query = cli.query();

    match orchestrator.run_once(&query).await {
        Ok(summary) => {
            tracing::info!(
                "Done: {} succeeded, {} failed ({:.1}% success)",
                summary.succeeded,
                summary.failed,
                summary.success_rate()
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            Err(e.into())
        }
    }
}

/// Launches a browser and wraps it in the rendered fetch strategy
async fn launch_rendered_fetcher(
    cli: &Cli,
    config: &Config,
) -> anyhow::Result<Box<dyn PageFetcher>> {
    let options = ChromiumOptions {
        headless: !cli.show_browser,
        user_agent: config.source.user_agent.clone(),
        chrome_path: cli
            .chrome_path
            .clone()
            .or_else(|| config.render.chrome_path.clone()),
        request_timeout: Duration::from_secs(config.source.request_timeout_secs),
    };

    tracing::info!(
        "Launching {} browser",
        if options.headless { "headless" } else { "visible" }
    );
    let backend = ChromiumBackend::launch(&options)
        .await
        .context("Failed to launch browser")?;

    Ok(Box::new(RenderedFetcher::new(
        backend,
        RenderPlan::from_pacing(&config.pacing),
    )))
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelf_drift=info,warn"),
            1 => EnvFilter::new("shelf_drift=debug,info"),
            2 => EnvFilter::new("shelf_drift=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
