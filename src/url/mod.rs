//! URL handling module for Shelf-Drift
//!
//! This module builds listing URLs from category queries and resolves the
//! links and image references found inside product cards.

mod query;
mod resolve;

// Re-export main functions
pub use query::{
    build_listing_url, CategoryQuery, FilterKey, ListingFilters, SortOrder, DEFAULT_LIMIT,
};
pub use resolve::{canonical_asset_url, resolve_href};
