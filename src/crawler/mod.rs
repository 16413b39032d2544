//! Crawler module for candidate checking
//!
//! This module contains the core search logic, including:
//! - HTTP fetching and response classification
//! - Page validation against the filter rules
//! - Bounded, cancellable scheduling with retries and progress
//! - Thread-safe aggregation of hits

mod aggregator;
mod fetcher;
mod page;
mod scheduler;
mod search;

pub use aggregator::{Aggregator, Hit, ResultSet};
pub use fetcher::{build_http_client, FetchOutcome, Fetcher, HttpFetcher};
pub use page::{parse_page, validate_page, Page, PageRules, ParsedPage, Rejection};
pub use scheduler::{fetch_with_retry, ProgressCallback, RetryPolicy, Scheduler, PROGRESS_INTERVAL};
pub use search::{check_one, check_page, search, SearchReport};
