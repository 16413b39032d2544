//! Classifier pass over search hits

use crate::classify::{Classifier, Finding};
use crate::crawler::{Aggregator, Fetcher, Hit, Page, ProgressCallback, RetryPolicy, Scheduler};
use crate::FinderError;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Outcome of a classifier pass
#[derive(Debug, Default)]
pub struct AnalysisReport {
    /// Every finding, grouped by page in the order pages completed
    pub findings: Vec<Finding>,

    /// Pages that were fetched again and classified
    pub pages_analyzed: usize,

    /// Why the pass stopped early, if it did
    pub error: Option<FinderError>,
}

impl AnalysisReport {
    pub fn accounts(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.is_account())
    }

    pub fn webhooks(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.is_webhook())
    }
}

/// Re-fetches every hit and runs the classifiers on its article text
///
/// Pages are fetched through the same bounded scheduler as a search, with
/// `workers` as the concurrency limit and no inter-request delay. A page that
/// no longer validates is skipped.
///
/// # Arguments
///
/// * `hits` - Pages confirmed by a search
/// * `fetcher` - Shared fetcher
/// * `classifiers` - Classifiers applied to each page, in order
/// * `workers` - Maximum pages in flight
/// * `retry` - Retry policy for transient failures
/// * `cancel` - Caller cancellation
/// * `on_progress` - Optional `(completed, total)` callback
pub async fn analyze(
    hits: &[Hit],
    fetcher: Arc<dyn Fetcher>,
    classifiers: Vec<Arc<dyn Classifier>>,
    workers: usize,
    retry: RetryPolicy,
    cancel: &CancellationToken,
    on_progress: Option<ProgressCallback>,
) -> AnalysisReport {
    if hits.is_empty() || classifiers.is_empty() {
        return AnalysisReport::default();
    }

    tracing::info!(
        "Analyzing {} pages with {} workers ({})",
        hits.len(),
        workers,
        classifiers.iter().map(|c| c.name()).collect::<Vec<_>>().join(", ")
    );

    let findings = Arc::new(Aggregator::new());
    let pages = Arc::new(Aggregator::new());
    let sink_findings = findings.clone();
    let sink_pages = pages.clone();

    let sink = move |page: Page| {
        let mut page_findings = Vec::new();
        for classifier in &classifiers {
            let found = classifier.classify(&page.text, &page.url);
            tracing::debug!("{}: {} findings on {}", classifier.name(), found.len(), page.url);
            page_findings.extend(found);
        }
        sink_findings.record_all(page_findings);
        sink_pages.record(page.url);
    };

    let scheduler = Scheduler::new(workers, Duration::ZERO, retry);
    let urls: Vec<String> = hits.iter().map(|hit| hit.url.clone()).collect();
    let outcome = scheduler
        .run(urls, hits.len(), fetcher, sink, cancel, on_progress)
        .await;

    let report = AnalysisReport {
        findings: findings.snapshot(),
        pages_analyzed: pages.len(),
        error: outcome.err(),
    };

    tracing::info!(
        "Analysis finished: {} findings on {} pages",
        report.findings.len(),
        report.pages_analyzed
    );

    report
}
