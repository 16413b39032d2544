//! Telegraph-Finder main entry point
//!
//! This is the command-line interface for the Telegraph-Finder slug enumerator.

use anyhow::{bail, Context};
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use telegraph_finder::classify::{
    analyze, AccountClassifier, Classifier, Finding, WebhookClassifier,
};
use telegraph_finder::config::{load_config_with_hash, validate, Config};
use telegraph_finder::crawler::{
    check_page, search, HttpFetcher, Page, ProgressCallback, RetryPolicy,
};
use telegraph_finder::output::{
    filter_findings, format_findings, format_hits, progress_line, with_suffix, write_findings,
    write_hits,
};
use telegraph_finder::FinderError;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Telegraph-Finder: finds Telegraph pages by guessing their date slugs
///
/// Telegraph names pages `{title}-{MM}-{DD}[-{N}]`. Telegraph-Finder checks
/// every such slug for a query, keeps the pages with real content and can
/// scan them for leaked accounts and webhook URLs.
#[derive(Parser, Debug)]
#[command(name = "telegraph-finder")]
#[command(version)]
#[command(about = "Finds Telegraph pages by guessing their date slugs", long_about = None)]
struct Cli {
    /// Search query; several words are joined with spaces
    #[arg(value_name = "QUERY", required_unless_present = "url")]
    query: Vec<String>,

    /// Check a single Telegraph URL instead of searching
    #[arg(short = 'u', long, value_name = "URL")]
    url: Option<String>,

    /// Scan found pages for accounts
    #[arg(long)]
    accounts: bool,

    /// Scan found pages for webhook URLs
    #[arg(long)]
    webhooks: bool,

    /// Account kind to keep (email, minecraft, ... or all)
    #[arg(long, value_name = "TYPE", default_value = "all")]
    account_type: String,

    /// Webhook kind to keep (discord, github, slack, generic or all)
    #[arg(long, value_name = "TYPE", default_value = "all")]
    webhook_type: String,

    /// File the results are saved to
    #[arg(short, long, value_name = "FILE", default_value = "results.txt")]
    output: PathBuf,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Maximum concurrent requests
    #[arg(long, value_name = "N")]
    concurrent: Option<u32>,

    /// Concurrent page fetches during analysis
    #[arg(long, value_name = "N")]
    analyze_workers: Option<u32>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Retries for a failed request
    #[arg(long, value_name = "N")]
    retry: Option<u32>,

    /// Delay between retries in milliseconds
    #[arg(long, value_name = "MS")]
    retry_delay: Option<u64>,

    /// Delay before each request in milliseconds
    #[arg(long, value_name = "MS")]
    delay: Option<u64>,

    /// Months to search, comma separated (e.g. 1,2,3)
    #[arg(long, value_name = "MONTHS", value_delimiter = ',')]
    months: Vec<u32>,

    /// Do not search the transliterated query
    #[arg(long)]
    no_translit: bool,

    /// Also try slugs carrying the two-digit year
    #[arg(long)]
    with_year: bool,

    /// Highest page index tried per day
    #[arg(long, value_name = "N")]
    max_index: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration
    fn apply_overrides(&self, config: &mut Config) {
        let search = &mut config.search;

        if let Some(concurrent) = self.concurrent {
            search.max_concurrent_requests = concurrent;
        }
        if let Some(timeout) = self.timeout {
            search.request_timeout_secs = timeout;
        }
        if let Some(retry) = self.retry {
            search.retry_count = retry;
        }
        if let Some(retry_delay) = self.retry_delay {
            search.retry_delay_ms = retry_delay;
        }
        if let Some(delay) = self.delay {
            search.request_delay_ms = delay;
        }
        if !self.months.is_empty() {
            search.months = self.months.clone();
        }
        if self.no_translit {
            search.transliterate = false;
        }
        if self.with_year {
            search.include_year = true;
        }
        if let Some(max_index) = self.max_index {
            search.max_index = max_index;
        }
        if let Some(workers) = self.analyze_workers {
            config.analysis.workers = workers;
        }
    }

    fn classifiers(&self) -> Vec<Arc<dyn Classifier>> {
        let mut classifiers: Vec<Arc<dyn Classifier>> = Vec::new();
        if self.accounts {
            classifiers.push(Arc::new(AccountClassifier::new()));
        }
        if self.webhooks {
            classifiers.push(Arc::new(WebhookClassifier::new()));
        }
        classifiers
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load_configuration(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    validate(&config).context("Invalid settings")?;

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let fetcher =
        Arc::new(HttpFetcher::from_config(&config).context("Failed to build HTTP client")?);

    match &cli.url {
        Some(url) => handle_single_url(&cli, fetcher, url).await,
        None => handle_search(&cli, &config, fetcher, &cancel).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("telegraph_finder=info,warn"),
            1 => EnvFilter::new("telegraph_finder=debug,info"),
            2 => EnvFilter::new("telegraph_finder=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, or the defaults when none is given
fn load_configuration(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    Ok(config)
}

/// Cancels the run on the first Ctrl-C
fn cancel_on_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing in-flight requests");
            cancel.cancel();
        }
    });
}

/// Progress callback redrawing a single stderr line
fn progress_printer(label: &'static str, quiet: bool) -> Option<ProgressCallback> {
    if quiet {
        return None;
    }

    let callback: ProgressCallback = Arc::new(move |completed: usize, total: usize| {
        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "\r{}", progress_line(label, completed, total));
        let _ = stderr.flush();
    });
    Some(callback)
}

/// Handles the search mode: enumerate, save hits, then optionally analyze them
async fn handle_search(
    cli: &Cli,
    config: &Config,
    fetcher: Arc<HttpFetcher>,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let query = cli.query.join(" ");
    let search_config = &config.search;

    println!("Searching Telegraph for: {}", query);
    println!(
        "  {} concurrent requests, {}s timeout, {}ms delay",
        search_config.max_concurrent_requests,
        search_config.request_timeout_secs,
        search_config.request_delay_ms
    );
    if !search_config.months.is_empty() {
        println!("  Months: {:?}", search_config.effective_months());
    }

    let report = search(
        &query,
        search_config,
        fetcher.clone(),
        cancel,
        progress_printer("Search", cli.quiet),
    )
    .await
    .context("Search could not start")?;
    if !cli.quiet {
        eprintln!();
    }

    let elapsed = report.elapsed.as_secs_f64();
    let rate = if elapsed > 0.0 {
        report.total_candidates as f64 / elapsed
    } else {
        0.0
    };
    println!(
        "Found {} pages out of {} candidates in {:.1}s ({:.1} checks/s)",
        report.results.len(),
        report.total_candidates,
        elapsed,
        rate
    );

    if !report.results.is_empty() {
        println!("\nPages found:");
        print!("{}", format_hits(&report.results));

        write_hits(&cli.output, &query, &report.results)
            .with_context(|| format!("Failed to save results to {}", cli.output.display()))?;
        println!("\nResults saved to {}", cli.output.display());
    } else if report.error.is_none() {
        println!("No pages found. Try another query.");
    }

    match report.error {
        None => {}
        Some(FinderError::Cancelled) => {
            println!("Search was interrupted; partial results were kept.");
            return Ok(());
        }
        Some(e) => bail!("Search stopped early: {}", e),
    }

    let classifiers = cli.classifiers();
    if classifiers.is_empty() || report.results.is_empty() {
        return Ok(());
    }

    println!("\nAnalyzing found pages...");
    let analysis = analyze(
        report.results.hits(),
        fetcher,
        classifiers,
        config.analysis.workers as usize,
        RetryPolicy::from_config(search_config),
        cancel,
        progress_printer("Analysis", cli.quiet),
    )
    .await;
    if !cli.quiet {
        eprintln!();
    }

    report_findings(cli, &analysis.findings)?;

    match analysis.error {
        None | Some(FinderError::Cancelled) => Ok(()),
        Some(e) => bail!("Analysis stopped early: {}", e),
    }
}

/// Handles the single URL mode (`-u`)
async fn handle_single_url(cli: &Cli, fetcher: Arc<HttpFetcher>, url: &str) -> anyhow::Result<()> {
    println!("Checking {}", url);

    let Some(page) = check_page(fetcher.as_ref(), url)
        .await
        .with_context(|| format!("Failed to check {}", url))?
    else {
        println!("No valid page at this URL.");
        return Ok(());
    };

    println!("Found: {} - {}", page.title, page.url);

    let findings = classify_page(&cli.classifiers(), &page);
    report_findings(cli, &findings)
}

fn classify_page(classifiers: &[Arc<dyn Classifier>], page: &Page) -> Vec<Finding> {
    classifiers
        .iter()
        .flat_map(|classifier| classifier.classify(&page.text, &page.url))
        .collect()
}

/// Prints and saves the account and webhook findings the user asked for
fn report_findings(cli: &Cli, findings: &[Finding]) -> anyhow::Result<()> {
    if cli.accounts {
        let accounts = filter_findings(findings.iter().filter(|f| f.is_account()), &cli.account_type);
        save_findings("accounts", &accounts, &with_suffix(&cli.output, ".accounts"))?;
    }

    if cli.webhooks {
        let webhooks = filter_findings(findings.iter().filter(|f| f.is_webhook()), &cli.webhook_type);
        save_findings("webhooks", &webhooks, &with_suffix(&cli.output, ".webhooks"))?;
    }

    Ok(())
}

fn save_findings(label: &str, findings: &[&Finding], path: &Path) -> anyhow::Result<()> {
    if findings.is_empty() {
        println!("\nNo {} found.", label);
        return Ok(());
    }

    println!("\nFound {} {}:", findings.len(), label);
    print!("{}", format_findings(findings.iter().copied()));

    write_findings(path, findings)
        .with_context(|| format!("Failed to save {} to {}", label, path.display()))?;
    println!("Saved to {}", path.display());

    Ok(())
}
