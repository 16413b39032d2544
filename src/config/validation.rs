use crate::config::types::{AnalysisConfig, BotConfig, Config, FilterConfig, SearchConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_search_config(&config.search)?;
    validate_filter_config(&config.filter)?;
    validate_analysis_config(&config.analysis)?;
    Ok(())
}

/// Validates search run tunables
pub fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > 500 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_requests must be between 1 and 500, got {}",
            config.max_concurrent_requests
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if let Some(month) = config.months.iter().find(|m| !(1..=12).contains(*m)) {
        return Err(ConfigError::Validation(format!(
            "months must be between 1 and 12, got {}",
            month
        )));
    }

    if config.max_index < 1 || config.max_index > 99 {
        return Err(ConfigError::Validation(format!(
            "max_index must be between 1 and 99, got {}",
            config.max_index
        )));
    }

    if let Some(year) = config.years.iter().find(|y| **y < 2000 || **y > 2099) {
        return Err(ConfigError::Validation(format!(
            "years must be between 2000 and 2099, got {}",
            year
        )));
    }

    validate_base_url(&config.base_url)?;

    Ok(())
}

/// Validates page filter rules
fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    if config.min_content_length < 1 {
        return Err(ConfigError::Validation(
            "min_content_length must be >= 1".to_string(),
        ));
    }

    if config.denylist.iter().any(|entry| entry.is_empty()) {
        return Err(ConfigError::Validation(
            "denylist entries cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates classifier pass configuration
fn validate_analysis_config(config: &AnalysisConfig) -> Result<(), ConfigError> {
    if config.workers < 1 {
        return Err(ConfigError::Validation(format!(
            "analysis workers must be >= 1, got {}",
            config.workers
        )));
    }

    Ok(())
}

/// Validates the bot section
///
/// Not part of [`validate`]: the command-line tool runs without a token.
pub fn validate_bot_config(config: &BotConfig) -> Result<(), ConfigError> {
    if config.token.trim().is_empty() {
        return Err(ConfigError::Validation(
            "bot token is missing (set bot.token or TELEGRAM_BOT_TOKEN)".to_string(),
        ));
    }

    if config.poll_timeout_secs < 1 || config.poll_timeout_secs > 50 {
        return Err(ConfigError::Validation(format!(
            "poll_timeout_secs must be between 1 and 50, got {}",
            config.poll_timeout_secs
        )));
    }

    if config.chunk_size < 1 || config.chunk_size > 100 {
        return Err(ConfigError::Validation(format!(
            "chunk_size must be between 1 and 100, got {}",
            config.chunk_size
        )));
    }

    if config.progress_interval_secs < 1 {
        return Err(ConfigError::Validation(
            "progress_interval_secs must be >= 1".to_string(),
        ));
    }

    let url = Url::parse(&config.api_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid api_url '{}': {}", config.api_url, e))
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "api_url '{}' must use http or https",
            config.api_url
        )));
    }

    Ok(())
}

/// The base URL must be a bare http(s) origin; slugs are appended after a '/'
fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", base_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            base_url
        )));
    }

    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must not carry a path, query or fragment",
            base_url
        )));
    }

    Ok(())
}
