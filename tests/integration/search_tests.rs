//! End-to-end search runs against a mock server

use crate::{start_server, telegraph_page, ARTICLE};
use std::sync::{Arc, Mutex};
use telegraph_finder::classify::{analyze, AccountClassifier, Classifier, WebhookClassifier};
use telegraph_finder::config::{Config, SearchConfig};
use telegraph_finder::crawler::{search, HttpFetcher, ProgressCallback, RetryPolicy};
use telegraph_finder::FinderError;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn search_config(base_url: &str) -> SearchConfig {
    SearchConfig {
        max_concurrent_requests: 4,
        request_timeout_secs: 5,
        retry_count: 0,
        retry_delay_ms: 0,
        request_delay_ms: 0,
        months: vec![6],
        max_index: 2,
        base_url: base_url.to_string(),
        ..SearchConfig::default()
    }
}

async fn mount_page(server: &MockServer, page_path: &str, title: &str, article: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(telegraph_page(title, article)))
        .expect(1)
        .mount(server)
        .await;
}

fn fetcher(config: &SearchConfig) -> Arc<HttpFetcher> {
    let config = Config {
        search: config.clone(),
        ..Config::default()
    };
    Arc::new(HttpFetcher::from_config(&config).expect("Failed to build fetcher"))
}

#[tokio::test]
async fn test_search_finds_pages() {
    let (server, base_url) = start_server().await;

    mount_page(&server, "/recipes-06-03", "Soup", ARTICLE).await;
    mount_page(&server, "/recipes-06-03-2", "Bread", ARTICLE).await;
    mount_page(&server, "/recipes-06-20", "Telegraph", ARTICLE).await;

    let config = search_config(&base_url);
    let samples = Arc::new(Mutex::new(Vec::new()));
    let recorded = samples.clone();
    let on_progress: ProgressCallback = Arc::new(move |completed: usize, total: usize| {
        recorded.lock().unwrap().push((completed, total));
    });

    let report = search(
        "recipes",
        &config,
        fetcher(&config),
        &CancellationToken::new(),
        Some(on_progress),
    )
    .await
    .expect("search failed to start");

    assert!(report.error.is_none());
    assert_eq!(report.total_candidates, 31 * 2);

    let mut lines = report.results.display_lines();
    lines.sort();
    assert_eq!(
        lines,
        vec![
            format!("Bread - {}/recipes-06-03-2", base_url),
            format!("Soup - {}/recipes-06-03", base_url),
        ]
    );

    let samples = samples.lock().unwrap();
    assert_eq!(samples.last(), Some(&(62, 62)));
    assert!(samples.windows(2).all(|w| w[0].0 <= w[1].0));

    // Every June candidate was requested exactly once
    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 62);
}

#[tokio::test]
async fn test_search_and_analyze() {
    let (server, base_url) = start_server().await;

    let leak = format!(
        "{} Credentials: alice@example.com:hunter22 and webhook: https://example.com/notify?id=7",
        ARTICLE
    );
    Mock::given(method("GET"))
        .and(path("/dump-06-11"))
        .respond_with(ResponseTemplate::new(200).set_body_string(telegraph_page("Dump", &leak)))
        .mount(&server)
        .await;

    let config = search_config(&base_url);
    let fetcher = fetcher(&config);
    let cancel = CancellationToken::new();

    let report = search("dump", &config, fetcher.clone(), &cancel, None)
        .await
        .expect("search failed to start");
    assert_eq!(report.results.len(), 1);

    let classifiers: Vec<Arc<dyn Classifier>> =
        vec![Arc::new(AccountClassifier::new()), Arc::new(WebhookClassifier::new())];
    let analysis = analyze(
        report.results.hits(),
        fetcher,
        classifiers,
        2,
        RetryPolicy::from_config(&config),
        &cancel,
        None,
    )
    .await;

    assert!(analysis.error.is_none());
    assert_eq!(analysis.pages_analyzed, 1);

    let accounts: Vec<String> = analysis.accounts().map(|f| f.to_string()).collect();
    assert_eq!(
        accounts,
        vec![format!("[email] alice@example.com:hunter22 ({}/dump-06-11)", base_url)]
    );

    let webhooks: Vec<String> = analysis.webhooks().map(|f| f.to_string()).collect();
    assert_eq!(
        webhooks,
        vec![format!("[generic] https://example.com/notify?id=7 ({}/dump-06-11)", base_url)]
    );
}

#[tokio::test]
async fn test_search_with_transliteration() {
    let (server, base_url) = start_server().await;

    mount_page(&server, "/privet-06-09", "Hello", ARTICLE).await;

    let config = SearchConfig {
        max_index: 1,
        ..search_config(&base_url)
    };

    let report = search(
        "Привет",
        &config,
        fetcher(&config),
        &CancellationToken::new(),
        None,
    )
    .await
    .expect("search failed to start");

    assert_eq!(report.total_candidates, 2 * 31);
    assert_eq!(
        report.results.display_lines(),
        vec![format!("Hello - {}/privet-06-09", base_url)]
    );
}

#[tokio::test]
async fn test_invalid_base_url_is_rejected() {
    let config = SearchConfig {
        base_url: "ftp://telegra.ph".to_string(),
        ..SearchConfig::default()
    };

    let result = search(
        "test",
        &config,
        fetcher(&SearchConfig::default()),
        &CancellationToken::new(),
        None,
    )
    .await;

    assert!(matches!(result, Err(FinderError::Config(_))));
}
