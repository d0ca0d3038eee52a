//! Configuration module for Shelf-Drift
//!
//! This module handles loading, parsing, and validating the TOML
//! configuration file, and reading content store credentials from the
//! environment.
//!
//! # Example
//!
//! ```no_run
//! use shelf_drift::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("shelf-drift.toml")).unwrap();
//! println!("Scraping from: {}", config.source.origin);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BotConfig, Config, PacingConfig, RenderConfig, SourceConfig, StoreBackend, StoreConfig,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, credentials_from, load_config, load_config_with_hash, load_credentials,
    load_dotenv, parse_config, Credentials,
};
