//! HTTP fetcher implementation
//!
//! This module handles the single-request side of a search:
//! - Building the shared HTTP client with the configured timeout
//! - Issuing one GET per candidate URL
//! - Classifying the response as hit, empty, transient or fatal
//!
//! Retries are not performed here; the scheduler owns the retry policy.

use crate::config::{Config, SearchConfig};
use crate::crawler::page::{validate_page, Page, PageRules};
use crate::FinderError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchOutcome {
    /// The URL hosts a valid, allowed page
    Hit(Page),

    /// Nothing worth reporting: non-200 status or a rejected page
    Empty,

    /// Network or timeout failure; the caller may retry
    Transient(String),

    /// Unrecoverable error; aborts the whole run
    Fatal(FinderError),
}

/// Something that can check a candidate URL
///
/// [`HttpFetcher`] is the real implementation; tests substitute fakes.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches and validates one URL
    async fn fetch(&self, url: &str) -> FetchOutcome;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The search configuration (supplies the request timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use telegraph_finder::config::SearchConfig;
/// use telegraph_finder::crawler::build_http_client;
///
/// let client = build_http_client(&SearchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &SearchConfig) -> Result<Client, reqwest::Error> {
    let user_agent = format!("telegraph-finder/{}", env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(config.request_timeout())
        .connect_timeout(config.request_timeout().min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetcher backed by a shared `reqwest` client
///
/// The client is cloned cheaply and shared read-only by every task; connection
/// pooling is handled inside it.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    rules: Arc<PageRules>,
}

impl HttpFetcher {
    pub fn new(client: Client, rules: PageRules) -> Self {
        Self {
            client,
            rules: Arc::new(rules),
        }
    }

    /// Builds a fetcher from the full configuration
    pub fn from_config(config: &Config) -> Result<Self, FinderError> {
        let client = build_http_client(&config.search)?;
        Ok(Self::new(client, PageRules::from(&config.filter)))
    }

    pub fn rules(&self) -> &PageRules {
        &self.rules
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// # Outcome Mapping
    ///
    /// | Condition | Outcome |
    /// |-----------|---------|
    /// | Unusable URL (request builder error) | Fatal |
    /// | Timeout, connection or body read error | Transient |
    /// | Status other than 200 | Empty |
    /// | Page rejected by validation | Empty |
    /// | Valid page | Hit |
    async fn fetch(&self, url: &str) -> FetchOutcome {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) if e.is_builder() => {
                return FetchOutcome::Fatal(FinderError::Http {
                    url: url.to_string(),
                    source: e,
                });
            }
            Err(e) => return FetchOutcome::Transient(describe_error(&e)),
        };

        let status = response.status();
        tracing::trace!("GET {} -> {}", url, status);

        if status != StatusCode::OK {
            return FetchOutcome::Empty;
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return FetchOutcome::Transient(describe_error(&e)),
        };

        match validate_page(&body, url, &self.rules) {
            Ok(page) => FetchOutcome::Hit(page),
            Err(rejection) => {
                tracing::debug!("Rejected {}: {}", url, rejection);
                FetchOutcome::Empty
            }
        }
    }
}

/// Short description of a transport error for logs
fn describe_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else {
        e.to_string()
    }
}
