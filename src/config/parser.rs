use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variables the store URL may be read from, in priority order
const URL_VARS: [&str; 2] = ["SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"];

/// Environment variable holding the service role key
const KEY_VAR: &str = "SUPABASE_SERVICE_ROLE_KEY";

/// Dotenv files consulted before reading credentials, first match wins per key
const DOTENV_FILES: [&str; 2] = [".env.local", ".env"];

/// Credentials for the remote content store
#[derive(Clone)]
pub struct Credentials {
    pub url: String,
    pub service_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url)
            .field("service_key", &"<redacted>")
            .finish()
    }
}

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use shelf_drift::config::load_config;
///
/// let config = load_config(Path::new("shelf-drift.toml")).unwrap();
/// println!("Origin: {}", config.source.origin);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let mut config: Config = toml::from_str(content)?;
    config.source.origin = config.source.origin.trim_end_matches('/').to_string();
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so runs can be correlated with the config they used.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(hash_content(&content))
}

fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, hash_content(&content)))
}

/// Seeds the process environment from dotenv files, if present
///
/// Variables already set in the environment are never overridden.
pub fn load_dotenv() {
    for file in DOTENV_FILES {
        match dotenvy::from_filename(file) {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!("Ignoring unreadable {}: {}", file, e),
        }
    }
}

/// Reads content store credentials from the process environment
pub fn load_credentials() -> Result<Credentials, ConfigError> {
    credentials_from(|key| std::env::var(key).ok())
}

/// Resolves credentials through an arbitrary variable lookup
///
/// Empty values are treated as missing.
pub fn credentials_from<F>(lookup: F) -> Result<Credentials, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let url = URL_VARS
        .iter()
        .find_map(|key| non_empty(key))
        .ok_or_else(|| ConfigError::MissingCredential(URL_VARS.join(" or ")))?;

    let service_key =
        non_empty(KEY_VAR).ok_or_else(|| ConfigError::MissingCredential(KEY_VAR.to_string()))?;

    if ::url::Url::parse(&url).is_err() {
        return Err(ConfigError::InvalidUrl(url));
    }

    Ok(Credentials {
        url: url.trim_end_matches('/').to_string(),
        service_key,
    })
}
