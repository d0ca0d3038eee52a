use serde::Deserialize;

/// Main configuration structure for Shelf-Drift
///
/// Every section has defaults, so an empty TOML document (or no file at all)
/// yields a usable configuration for a local SQLite run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

/// Source catalog site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Scheme and host of the catalog, without a trailing slash
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Site name, used as the brand placeholder when a card has none
    #[serde(rename = "site-name", default = "default_site_name")]
    pub site_name: String,

    /// Browser-like user agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Accept-Language header value
    #[serde(rename = "accept-language", default = "default_accept_language")]
    pub accept_language: String,

    /// Per-request timeout for listing pages and images (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Fixed-sleep pacing between pipeline steps
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    /// Pause after each card extraction (milliseconds)
    #[serde(rename = "card-delay-ms", default = "default_step_delay")]
    pub card_delay_ms: u64,

    /// Pause after each publish attempt (milliseconds)
    #[serde(rename = "publish-delay-ms", default = "default_step_delay")]
    pub publish_delay_ms: u64,

    /// Number of scroll-to-bottom rounds for rendered fetches
    #[serde(rename = "scroll-rounds", default = "default_scroll_rounds")]
    pub scroll_rounds: u32,

    /// Pause after each scroll round (milliseconds)
    #[serde(rename = "scroll-delay-ms", default = "default_scroll_delay")]
    pub scroll_delay_ms: u64,

    /// Deadline for product cards to appear in a rendered page (seconds)
    #[serde(rename = "render-timeout-secs", default = "default_render_timeout")]
    pub render_timeout_secs: u64,
}

/// Bot identity attributes
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Fixed display name the bot is looked up by
    #[serde(rename = "display-name", default = "default_display_name")]
    pub display_name: String,

    /// Email of the backing account
    #[serde(default = "default_bot_email")]
    pub email: String,

    /// Height shown on every published post
    #[serde(default = "default_bot_height")]
    pub height: u32,

    /// Size shown on every published post
    #[serde(default = "default_bot_size")]
    pub size: String,
}

/// Which content store adapter to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Supabase,
}

/// Content store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Path to the SQLite database file (sqlite backend)
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,

    /// Base URL public object references are built from (sqlite backend)
    #[serde(rename = "public-base-url", default = "default_public_base_url")]
    pub public_base_url: String,

    /// Storage bucket images are uploaded into
    #[serde(default = "default_bucket")]
    pub bucket: String,
}

/// Rendering backend configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderConfig {
    /// Chrome/Chromium executable; auto-detected when unset
    #[serde(rename = "chrome-path", default)]
    pub chrome_path: Option<String>,
}

fn default_origin() -> String {
    "https://www.zalando.fr".to_string()
}

fn default_site_name() -> String {
    "Zalando".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_accept_language() -> String {
    "fr-FR,fr;q=0.9,en-US;q=0.8,en;q=0.7".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_step_delay() -> u64 {
    1000
}

fn default_scroll_rounds() -> u32 {
    3
}

fn default_scroll_delay() -> u64 {
    2000
}

fn default_render_timeout() -> u64 {
    20
}

fn default_display_name() -> String {
    "InFit_Official".to_string()
}

fn default_bot_email() -> String {
    "bot@infit.app".to_string()
}

fn default_bot_height() -> u32 {
    180
}

fn default_bot_size() -> String {
    "M".to_string()
}

fn default_database_path() -> String {
    "./shelf-drift.db".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:8000/storage".to_string()
}

fn default_bucket() -> String {
    "outfits".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            site_name: default_site_name(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            card_delay_ms: default_step_delay(),
            publish_delay_ms: default_step_delay(),
            scroll_rounds: default_scroll_rounds(),
            scroll_delay_ms: default_scroll_delay(),
            render_timeout_secs: default_render_timeout(),
        }
    }
}

impl PacingConfig {
    /// Pacing with every pause set to zero, for tests and local replays
    pub fn immediate() -> Self {
        Self {
            card_delay_ms: 0,
            publish_delay_ms: 0,
            scroll_rounds: default_scroll_rounds(),
            scroll_delay_ms: 0,
            render_timeout_secs: 0,
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            display_name: default_display_name(),
            email: default_bot_email(),
            height: default_bot_height(),
            size: default_bot_size(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            database_path: default_database_path(),
            public_base_url: default_public_base_url(),
            bucket: default_bucket(),
        }
    }
}

