//! Bounded scheduler for candidate checks
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore (the admission gate)
//! - A fixed delay every admitted task waits before its request
//! - Retrying transient failures, then demoting them to empty
//! - Run-wide cancellation, including fail-fast on the first fatal error
//! - Periodic progress sampling for a caller-supplied callback

use crate::crawler::fetcher::{FetchOutcome, Fetcher};
use crate::crawler::page::Page;
use crate::config::SearchConfig;
use crate::FinderError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

/// How often the progress reporter samples the completed counter
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Progress callback receiving `(completed, total)`
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Retry settings for transient fetch failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub retry_count: u32,

    /// Pause between attempts
    pub retry_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            retry_count: config.retry_count,
            retry_delay: config.retry_delay(),
        }
    }
}

/// Fetches one URL, retrying transient failures
///
/// Attempts are strictly sequential. A transient outcome is retried up to
/// `policy.retry_count` times; when retries run out the outcome becomes
/// [`FetchOutcome::Empty`].
///
/// # Returns
///
/// * `Some(outcome)` - The final outcome (never `Transient`)
/// * `None` - The token was cancelled before an outcome was reached
pub async fn fetch_with_retry(
    fetcher: &dyn Fetcher,
    url: &str,
    policy: RetryPolicy,
    token: &CancellationToken,
) -> Option<FetchOutcome> {
    let mut attempt: u32 = 0;

    loop {
        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => return None,
            outcome = fetcher.fetch(url) => outcome,
        };

        match outcome {
            FetchOutcome::Transient(reason) if attempt < policy.retry_count => {
                attempt += 1;
                tracing::debug!(
                    "Transient failure for {} ({}), retry {}/{}",
                    url,
                    reason,
                    attempt,
                    policy.retry_count
                );

                if !policy.retry_delay.is_zero() {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => return None,
                        _ = tokio::time::sleep(policy.retry_delay) => {}
                    }
                }
            }
            FetchOutcome::Transient(reason) => {
                tracing::debug!(
                    "Giving up on {} after {} attempts: {}",
                    url,
                    attempt + 1,
                    reason
                );
                return Some(FetchOutcome::Empty);
            }
            other => return Some(other),
        }
    }
}

/// Per-task state shared by every task of one run
struct TaskContext<S> {
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<S>,
    token: CancellationToken,
    completed: Arc<AtomicUsize>,
    request_delay: Duration,
    retry: RetryPolicy,
}

impl<S> Clone for TaskContext<S> {
    fn clone(&self) -> Self {
        Self {
            fetcher: self.fetcher.clone(),
            sink: self.sink.clone(),
            token: self.token.clone(),
            completed: self.completed.clone(),
            request_delay: self.request_delay,
            retry: self.retry,
        }
    }
}

/// Scheduler runs candidate checks under a global concurrency limit
///
/// The scheduler coordinates:
/// - The admission gate: a permit is taken before a task is spawned and
///   released when the task finishes, so at most `max_concurrency` tasks exist
/// - The inter-request delay each admitted task waits before fetching
/// - Retries of transient failures
/// - Cancellation from the caller or from the first fatal error
/// - Progress reporting
pub struct Scheduler {
    /// Global semaphore for limiting concurrent fetches
    gate: Arc<Semaphore>,

    max_concurrency: usize,

    request_delay: Duration,

    retry: RetryPolicy,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `max_concurrency` - Maximum tasks in flight (at least 1)
    /// * `request_delay` - Delay each task waits after admission
    /// * `retry` - Retry policy for transient failures
    pub fn new(max_concurrency: usize, request_delay: Duration, retry: RetryPolicy) -> Self {
        let max_concurrency = max_concurrency.max(1);

        Self {
            gate: Arc::new(Semaphore::new(max_concurrency)),
            max_concurrency,
            request_delay,
            retry,
        }
    }

    /// Creates a scheduler for the candidate search pass
    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(
            config.max_concurrent_requests as usize,
            config.request_delay(),
            RetryPolicy::from_config(config),
        )
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Runs a check for every URL and waits for all of them
    ///
    /// Every page that comes back as a hit is handed to `sink`. URLs are pulled
    /// from `urls` lazily, one per free permit.
    ///
    /// # Arguments
    ///
    /// * `urls` - The URLs to check
    /// * `total` - Number of URLs, reported to the progress callback
    /// * `fetcher` - Shared fetcher
    /// * `sink` - Receives each hit page
    /// * `cancel` - Caller cancellation; cancelling it aborts the run
    /// * `on_progress` - Optional `(completed, total)` callback
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Every URL was checked
    /// * `Err(FinderError)` - The first fatal error, or `Cancelled` when the
    ///   caller cancelled; work finished before that point has reached `sink`
    pub async fn run<I, S>(
        &self,
        urls: I,
        total: usize,
        fetcher: Arc<dyn Fetcher>,
        sink: S,
        cancel: &CancellationToken,
        on_progress: Option<ProgressCallback>,
    ) -> Result<(), FinderError>
    where
        I: IntoIterator<Item = String>,
        S: Fn(Page) + Send + Sync + 'static,
    {
        let run_token = cancel.child_token();
        let done_token = run_token.child_token();
        let completed = Arc::new(AtomicUsize::new(0));

        let reporter = on_progress
            .map(|callback| spawn_reporter(completed.clone(), total, callback, done_token.clone()));

        let context = TaskContext {
            fetcher,
            sink: Arc::new(sink),
            token: run_token.clone(),
            completed: completed.clone(),
            request_delay: self.request_delay,
            retry: self.retry,
        };

        let mut tasks = JoinSet::new();
        let mut first_error: Option<FinderError> = None;
        let mut dispatched: usize = 0;

        for url in urls {
            let permit = tokio::select! {
                biased;
                _ = run_token.cancelled() => break,
                permit = self.gate.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            while let Some(joined) = tasks.try_join_next() {
                record_join(joined, &mut first_error, &run_token);
            }

            let context = context.clone();
            tasks.spawn(async move {
                let _permit = permit;
                run_task(context, url).await
            });
            dispatched += 1;
        }

        while let Some(joined) = tasks.join_next().await {
            record_join(joined, &mut first_error, &run_token);
        }

        done_token.cancel();
        if let Some(reporter) = reporter {
            let _ = reporter.await;
        }

        tracing::debug!(
            "Scheduler finished: {} dispatched, {} completed",
            dispatched,
            completed.load(Ordering::Relaxed)
        );

        match first_error {
            Some(e) => Err(e),
            None if cancel.is_cancelled() => Err(FinderError::Cancelled),
            None => Ok(()),
        }
    }
}

/// Checks one URL inside a spawned task
///
/// Returns an error only for a fatal outcome; observing cancellation is not an
/// error for the task.
async fn run_task<S>(context: TaskContext<S>, url: String) -> Result<(), FinderError>
where
    S: Fn(Page) + Send + Sync + 'static,
{
    if context.token.is_cancelled() {
        return Ok(());
    }

    if !context.request_delay.is_zero() {
        tokio::select! {
            biased;
            _ = context.token.cancelled() => return Ok(()),
            _ = tokio::time::sleep(context.request_delay) => {}
        }
    }

    let Some(outcome) =
        fetch_with_retry(context.fetcher.as_ref(), &url, context.retry, &context.token).await
    else {
        return Ok(());
    };

    let result = match outcome {
        FetchOutcome::Hit(page) => {
            tracing::info!("Found: {} - {}", page.title, page.url);
            (context.sink)(page);
            Ok(())
        }
        FetchOutcome::Fatal(e) => {
            tracing::warn!("Fatal error for {}: {}", url, e);
            context.token.cancel();
            Err(e)
        }
        FetchOutcome::Empty | FetchOutcome::Transient(_) => Ok(()),
    };

    context.completed.fetch_add(1, Ordering::Relaxed);
    result
}

/// Keeps the first fatal error; later ones are discarded
fn record_join(
    joined: Result<Result<(), FinderError>, JoinError>,
    first_error: &mut Option<FinderError>,
    run_token: &CancellationToken,
) {
    let error = match joined {
        Ok(Ok(())) => return,
        Ok(Err(e)) => e,
        Err(e) => FinderError::TaskFailed(e.to_string()),
    };

    run_token.cancel();
    if first_error.is_none() {
        *first_error = Some(error);
    }
}

/// Spawns the task that samples progress until `done` fires
///
/// A final sample is always delivered after `done`, so the last callback
/// reflects the finished run.
fn spawn_reporter(
    completed: Arc<AtomicUsize>,
    total: usize,
    callback: ProgressCallback,
    done: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PROGRESS_INTERVAL);
        loop {
            tokio::select! {
                _ = done.cancelled() => {
                    callback(completed.load(Ordering::Acquire), total);
                    break;
                }
                _ = ticker.tick() => callback(completed.load(Ordering::Acquire), total),
            }
        }
    })
}
