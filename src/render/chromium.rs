//! Chromium rendering backend
//!
//! Launches a local Chrome/Chromium and drives it over the DevTools protocol
//! with `chromiumoxide`. The browser, its event handler task and the working
//! tab are owned by a `BrowserSession` guard: `close` shuts the browser down
//! and waits for the handler to drain, and dropping an unclosed guard stops
//! the handler and lets `Browser`'s own drop kill the child process.

use crate::render::{RenderBackend, RenderError, RenderResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures_util::StreamExt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight);";
const HIDE_WEBDRIVER_SCRIPT: &str =
    "Object.defineProperty(navigator, 'webdriver', {get: () => undefined})";

/// How long `close` waits for the event handler to drain
const HANDLER_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

const WINDOW_WIDTH: u32 = 1920;
const WINDOW_HEIGHT: u32 = 1080;

/// How to launch the browser
#[derive(Debug, Clone)]
pub struct ChromiumOptions {
    /// Run without a visible window
    pub headless: bool,
    /// User agent the browser announces
    pub user_agent: String,
    /// Chrome/Chromium executable; auto-detected when absent
    pub chrome_path: Option<String>,
    /// Timeout for each DevTools request
    pub request_timeout: Duration,
}

impl ChromiumOptions {
    /// Chrome command-line arguments for these options
    ///
    /// The sandbox switch is set on the builder, not here.
    pub fn chrome_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.headless {
            args.push("--headless=new".to_string());
        }
        args.push("--disable-gpu".to_string());
        args.push("--disable-dev-shm-usage".to_string());
        args.push("--no-first-run".to_string());
        args.push("--no-default-browser-check".to_string());
        args.push("--disable-blink-features=AutomationControlled".to_string());
        args.push(format!("--user-agent={}", self.user_agent));
        args
    }

    /// Launch configuration for `Browser::launch`
    ///
    /// Headless mode is driven by `--headless=new` in `chrome_args`, so the
    /// builder is always put in headed mode to avoid a second headless flag.
    pub fn browser_config(&self) -> RenderResult<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .with_head()
            .no_sandbox()
            .disable_default_args()
            .window_size(WINDOW_WIDTH, WINDOW_HEIGHT)
            .request_timeout(self.request_timeout);

        for arg in self.chrome_args() {
            builder = builder.arg(arg);
        }
        if let Some(path) = &self.chrome_path {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(RenderError::Launch)
    }
}

/// An exclusive browser with one working tab
pub struct BrowserSession {
    browser: Mutex<Option<Browser>>,
    handler: Option<JoinHandle<()>>,
    page: Option<Page>,
}

impl BrowserSession {
    /// Launches the browser and opens a blank tab
    pub async fn launch(options: &ChromiumOptions) -> RenderResult<Self> {
        let config = options.browser_config()?;
        let (browser, mut handler) = Browser::launch(config).await?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler error: {}", e);
                }
            }
        });

        // Owned by the guard from here on, so a failed tab open still cleans up
        let mut session = Self {
            browser: Mutex::new(Some(browser)),
            handler: Some(handler),
            page: None,
        };

        let page = match session.browser.get_mut().as_ref() {
            Some(browser) => browser.new_page("about:blank").await?,
            None => return Err(RenderError::SessionClosed),
        };
        session.page = Some(page);

        tracing::debug!("Launched browser session");
        Ok(session)
    }

    pub fn is_open(&self) -> bool {
        self.page.is_some()
    }

    /// The working tab, while the session is open
    pub fn page(&self) -> RenderResult<&Page> {
        self.page.as_ref().ok_or(RenderError::SessionClosed)
    }

    /// Closes the browser and waits for its handler; closing twice is a no-op
    pub async fn close(&mut self) -> RenderResult<()> {
        self.page = None;
        let Some(mut browser) = self.browser.get_mut().take() else {
            return Ok(());
        };

        let closed = browser.close().await;
        if let Err(e) = browser.wait().await {
            tracing::warn!("Failed to wait for browser exit: {}", e);
        }

        if let Some(handler) = self.handler.take() {
            let abort = handler.abort_handle();
            if tokio::time::timeout(HANDLER_SHUTDOWN_TIMEOUT, handler)
                .await
                .is_err()
            {
                tracing::warn!("Browser handler still running after close, aborting it");
                abort.abort();
            }
        }

        closed?;
        tracing::debug!("Closed browser session");
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if self.browser.get_mut().is_none() {
            return;
        }

        tracing::warn!("Browser session dropped without close");
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
        // Dropping `Browser` kills the child process
    }
}

/// Rendering backend backed by a local Chromium
pub struct ChromiumBackend {
    session: BrowserSession,
}

impl ChromiumBackend {
    /// Launches a browser session with `options`
    pub async fn launch(options: &ChromiumOptions) -> RenderResult<Self> {
        let session = BrowserSession::launch(options).await?;
        Ok(Self { session })
    }

    pub fn session(&self) -> &BrowserSession {
        &self.session
    }
}

#[async_trait]
impl RenderBackend for ChromiumBackend {
    async fn navigate(&self, url: &str) -> RenderResult<()> {
        let page = self.session.page()?;
        page.goto(url).await?;
        if let Err(e) = page.evaluate(HIDE_WEBDRIVER_SCRIPT).await {
            tracing::debug!("Could not mask navigator.webdriver: {}", e);
        }
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> RenderResult<()> {
        self.session.page()?.evaluate(SCROLL_SCRIPT).await?;
        Ok(())
    }

    async fn has_element(&self, selector: &str) -> RenderResult<bool> {
        let found = self.session.page()?.find_elements(selector).await?;
        Ok(!found.is_empty())
    }

    async fn page_source(&self) -> RenderResult<String> {
        Ok(self.session.page()?.content().await?)
    }

    async fn close(&mut self) -> RenderResult<()> {
        self.session.close().await
    }
}
