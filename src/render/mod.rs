//! Rendering backend module
//!
//! Dynamically-rendered listing pages need a real browser. This module
//! defines the narrow contract the rendered fetch strategy relies on
//! (navigate, scroll, probe for selectors, read back the materialized markup)
//! and a Chromium implementation of it.

mod chromium;

pub use chromium::{BrowserSession, ChromiumBackend, ChromiumOptions};

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a rendering backend
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("Invalid browser launch configuration: {0}")]
    Launch(String),

    #[error("Browser session already closed")]
    SessionClosed,
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

/// A browser-like backend able to render and script a page
#[async_trait]
pub trait RenderBackend: Send + Sync {
    /// Loads `url` in the browser
    async fn navigate(&self, url: &str) -> RenderResult<()>;

    /// Scrolls the current page to the bottom to trigger lazy loading
    async fn scroll_to_bottom(&self) -> RenderResult<()>;

    /// Returns true if at least one element matches the CSS `selector`
    async fn has_element(&self, selector: &str) -> RenderResult<bool>;

    /// Materialized markup of the current page
    async fn page_source(&self) -> RenderResult<String>;

    /// Releases the browser; later calls fail with `SessionClosed`
    async fn close(&mut self) -> RenderResult<()>;
}
