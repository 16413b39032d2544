//! Search entry points
//!
//! Ties the pieces of a run together: query variants and the candidate plan,
//! the bounded scheduler, the fetcher and the hit aggregator.

use crate::config::{validate_search_config, SearchConfig};
use crate::crawler::aggregator::{Aggregator, Hit, ResultSet};
use crate::crawler::fetcher::{FetchOutcome, Fetcher};
use crate::crawler::page::Page;
use crate::crawler::scheduler::{ProgressCallback, Scheduler};
use crate::slug::{CandidatePlan, SearchQuery};
use crate::FinderError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Outcome of a search run
///
/// A run that stops early (cancellation or a fatal error) still returns the
/// hits found up to that point together with the error.
#[derive(Debug)]
pub struct SearchReport {
    pub query: SearchQuery,

    /// Number of candidate URLs the run was planned to check
    pub total_candidates: usize,

    pub results: ResultSet,

    /// Why the run stopped early, if it did
    pub error: Option<FinderError>,

    pub elapsed: Duration,
}

impl SearchReport {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Searches every date slug for a query
///
/// # Arguments
///
/// * `query` - Free-text query; its slug and (optionally) transliterated slug
///   are both searched
/// * `config` - Search settings for this run
/// * `fetcher` - Shared fetcher used for every candidate
/// * `cancel` - Caller cancellation
/// * `on_progress` - Optional `(completed, total)` callback, sampled every 100ms
///
/// # Returns
///
/// * `Ok(SearchReport)` - The run started; check `report.error` for an early stop
/// * `Err(FinderError)` - Invalid settings or an empty query; nothing was fetched
pub async fn search(
    query: &str,
    config: &SearchConfig,
    fetcher: Arc<dyn Fetcher>,
    cancel: &CancellationToken,
    on_progress: Option<ProgressCallback>,
) -> Result<SearchReport, FinderError> {
    validate_search_config(config)?;

    let query = SearchQuery::new(query, config.transliterate)?;
    let plan = CandidatePlan::from_config(&query, config);
    let total = plan.len();

    tracing::info!(
        "Searching {:?} across months {:?}: {} candidates",
        query.variants(),
        plan.months(),
        total
    );

    let start = Instant::now();
    let aggregator = Arc::new(Aggregator::new());
    let sink_aggregator = aggregator.clone();

    let scheduler = Scheduler::from_config(config);
    let outcome = scheduler
        .run(
            plan.iter(),
            total,
            fetcher,
            move |page: Page| sink_aggregator.record(Hit::from(&page)),
            cancel,
            on_progress,
        )
        .await;

    let results = ResultSet::new(aggregator.snapshot());
    let elapsed = start.elapsed();

    match &outcome {
        Ok(()) => tracing::info!("Search finished: {} hits in {:?}", results.len(), elapsed),
        Err(e) => tracing::warn!(
            "Search stopped after {:?} with {} hits: {}",
            elapsed,
            results.len(),
            e
        ),
    }

    Ok(SearchReport {
        query,
        total_candidates: total,
        results,
        error: outcome.err(),
        elapsed,
    })
}

/// Checks a single URL and returns the validated page
///
/// Unlike a search, a transient failure is reported as an error here.
pub async fn check_page(fetcher: &dyn Fetcher, url: &str) -> Result<Option<Page>, FinderError> {
    match fetcher.fetch(url).await {
        FetchOutcome::Hit(page) => Ok(Some(page)),
        FetchOutcome::Empty => Ok(None),
        FetchOutcome::Transient(message) => Err(FinderError::Fetch {
            url: url.to_string(),
            message,
        }),
        FetchOutcome::Fatal(e) => Err(e),
    }
}

/// Checks a single URL
///
/// # Returns
///
/// * `Ok(Some(Hit))` - The URL hosts a valid page
/// * `Ok(None)` - Missing, placeholder or denylisted page
/// * `Err(FinderError)` - The URL could not be fetched
pub async fn check_one(fetcher: &dyn Fetcher, url: &str) -> Result<Option<Hit>, FinderError> {
    Ok(check_page(fetcher, url).await?.map(|page| Hit::from(&page)))
}
