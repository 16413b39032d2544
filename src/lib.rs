//! Telegraph-Finder: a date-slug enumerator for Telegraph pages
//!
//! This crate guesses Telegraph page slugs of the form `{title}-{MM}-{DD}[-{N}]`
//! for a query, checks every candidate under a bounded concurrency budget and
//! collects the pages that hold real content. Confirmed pages can then be run
//! through pluggable classifiers that extract leaked accounts and webhook URLs.
//! The same search is also served to Telegram users by the [`bot`] module.

pub mod bot;
pub mod classify;
pub mod config;
pub mod crawler;
pub mod output;
pub mod slug;

use thiserror::Error;

/// Main error type for Telegraph-Finder operations
#[derive(Debug, Error)]
pub enum FinderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Search query '{0}' produces an empty slug")]
    EmptyQuery(String),

    #[error("Run was cancelled")]
    Cancelled,

    #[error("Task failed: {0}")]
    TaskFailed(String),
}

/// Configuration-specific errors
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
}

/// Result type alias for Telegraph-Finder operations
pub type Result<T> = std::result::Result<T, FinderError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use classify::{AccountClassifier, Classifier, Finding, WebhookClassifier};
pub use config::Config;
pub use crawler::{check_one, search, FetchOutcome, Fetcher, Hit, HttpFetcher, ResultSet};
pub use slug::{transliterate, CandidatePlan, SearchQuery};
