//! Shelf-Drift: a catalog scraping and post publishing pipeline
//!
//! This crate fetches listing pages from an e-commerce catalog, extracts
//! product cards from the markup, and publishes them as posts into a content
//! store under a service-owned bot account.

pub mod config;
pub mod crawler;
pub mod output;
pub mod publish;
pub mod render;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Shelf-Drift operations
#[derive(Debug, Error)]
pub enum ShelfError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    #[error("Store error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("Render error: {0}")]
    Render(#[from] render::RenderError),

    #[error("Run state error: {0}")]
    State(#[from] state::InvalidTransition),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
///
/// These are the only errors allowed to abort a run before it starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing required credential: {0}")]
    MissingCredential(String),
}

/// Errors retrieving a listing page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Render backend failed for {url}: {source}")]
    Render {
        url: String,
        source: render::RenderError,
    },
}

/// Reasons a single product card is discarded during extraction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("card has no link")]
    MissingLink,

    #[error("card has no usable image")]
    MissingImage,

    #[error("unresolvable URL in card: {0}")]
    InvalidUrl(String),
}

/// Errors publishing a single product, or bootstrapping the bot identity
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Image download failed for {url}: {source}")]
    ImageDownload { url: String, source: reqwest::Error },

    #[error("Image download for {url} returned HTTP {status}")]
    ImageStatus { url: String, status: u16 },

    #[error("Store rejected write: {0}")]
    Store(#[from] storage::StoreError),

    #[error("Post insert returned no identifier")]
    MissingPostId,

    #[error("Bot account {account_id} exists but its profile could not be created: {source}")]
    IdentityIncomplete {
        account_id: String,
        source: storage::StoreError,
    },
}

/// Result type alias for Shelf-Drift operations
pub type Result<T> = std::result::Result<T, ShelfError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for page fetches
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for publish operations
pub type PublishResult<T> = std::result::Result<T, PublishError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{extract_products, Orchestrator, ProductRecord};
pub use output::RunSummary;
pub use url::{build_listing_url, CategoryQuery, SortOrder};
