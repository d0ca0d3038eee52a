//! Crawler module for listing pages
//!
//! This module contains the scraping half of the pipeline:
//! - Page fetching, static or browser-rendered
//! - Product card extraction
//! - Fixed pacing between steps
//! - The run orchestrator tying fetch, extract and publish together

mod coordinator;
mod extractor;
mod fetcher;
mod pacing;
mod rendered;

pub use coordinator::{Orchestrator, RunOptions};
pub use extractor::{
    extract_card, extract_products, locate_cards, CardExtractor, CardFragment, ExtractContext,
    NAME_PLACEHOLDER, PRICE_PLACEHOLDER,
};
pub use fetcher::{build_http_client, PageFetcher, RawListingPage, SelectorStrategy, StaticFetcher};
pub use pacing::Pacer;
pub use rendered::{RenderPlan, RenderedFetcher, DEFAULT_POLL_INTERVAL};

/// Size labels attached to every product
pub const DEFAULT_SIZES: [&str; 4] = ["S", "M", "L", "XL"];

/// Classification label attached to every product
pub const DEFAULT_CATEGORY: &str = "Vêtement";

/// One product extracted from a listing card
///
/// Lives only in memory between extraction and publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub name: String,
    pub brand: String,
    /// Display text as shown on the listing, not parsed
    pub price: String,
    /// Absolute image address with the query string removed
    pub image_url: String,
    /// Absolute product page address
    pub product_url: String,
    pub sizes: Vec<String>,
    /// `"{brand} - {name}"`
    pub description: String,
    pub category: String,
}
