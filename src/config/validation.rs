use crate::config::types::{
    BotConfig, Config, PacingConfig, RenderConfig, SourceConfig, StoreConfig,
};
use crate::ConfigError;
use url::Url;

/// Upper bound on scroll rounds; each round costs a full scroll pause
const MAX_SCROLL_ROUNDS: u32 = 10;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_pacing_config(&config.pacing)?;
    validate_bot_config(&config.bot)?;
    validate_store_config(&config.store)?;
    validate_render_config(&config.render)?;
    Ok(())
}

/// Validates source site configuration
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    validate_http_url("origin", &config.origin)?;

    if config.site_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "site-name cannot be empty".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates pacing configuration
fn validate_pacing_config(config: &PacingConfig) -> Result<(), ConfigError> {
    if config.scroll_rounds > MAX_SCROLL_ROUNDS {
        return Err(ConfigError::Validation(format!(
            "scroll-rounds must be <= {}, got {}",
            MAX_SCROLL_ROUNDS, config.scroll_rounds
        )));
    }
    Ok(())
}

/// Validates bot identity configuration
fn validate_bot_config(config: &BotConfig) -> Result<(), ConfigError> {
    if config.display_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "display-name cannot be empty".to_string(),
        ));
    }

    validate_email(&config.email)?;

    if config.size.trim().is_empty() {
        return Err(ConfigError::Validation("bot size cannot be empty".to_string()));
    }

    Ok(())
}

/// Validates content store configuration
fn validate_store_config(config: &StoreConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if config.bucket.is_empty() || config.bucket.contains('/') {
        return Err(ConfigError::Validation(format!(
            "bucket must be a single non-empty path segment, got '{}'",
            config.bucket
        )));
    }

    validate_http_url("public-base-url", &config.public_base_url)
}

/// Validates rendering backend configuration
fn validate_render_config(config: &RenderConfig) -> Result<(), ConfigError> {
    match &config.chrome_path {
        Some(path) if path.trim().is_empty() => Err(ConfigError::Validation(
            "chrome-path must not be empty when set".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Requires an absolute http(s) URL
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' has no host",
            field, value
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation("bot email cannot be empty".to_string()));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    Ok(())
}
