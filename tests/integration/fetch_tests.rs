//! HttpFetcher against a mock server

use crate::{start_server, telegraph_page, ARTICLE};
use telegraph_finder::config::Config;
use telegraph_finder::crawler::{check_one, FetchOutcome, Fetcher, HttpFetcher};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn fetcher() -> HttpFetcher {
    HttpFetcher::from_config(&Config::default()).expect("Failed to build fetcher")
}

#[tokio::test]
async fn test_valid_page_is_hit() {
    let (server, base_url) = start_server().await;

    Mock::given(method("GET"))
        .and(path("/notes-06-01"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(telegraph_page("Field Notes", ARTICLE))
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let url = format!("{}/notes-06-01", base_url);
    match fetcher().fetch(&url).await {
        FetchOutcome::Hit(page) => {
            assert_eq!(page.title, "Field Notes");
            assert_eq!(page.url, url);
            assert_eq!(page.text, ARTICLE);
        }
        other => panic!("expected a hit, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_page_is_empty() {
    let (_server, base_url) = start_server().await;

    // Unmatched routes answer 404
    let outcome = fetcher().fetch(&format!("{}/nothing-06-01", base_url)).await;
    assert!(matches!(outcome, FetchOutcome::Empty));
}

#[tokio::test]
async fn test_server_error_is_empty() {
    let (server, base_url) = start_server().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let outcome = fetcher().fetch(&format!("{}/broken-06-01", base_url)).await;
    assert!(matches!(outcome, FetchOutcome::Empty));
}

#[tokio::test]
async fn test_placeholder_page_is_empty() {
    let (server, base_url) = start_server().await;

    Mock::given(method("GET"))
        .and(path("/ghost-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_string(telegraph_page("Telegraph", ARTICLE)))
        .mount(&server)
        .await;

    let outcome = fetcher().fetch(&format!("{}/ghost-06-01", base_url)).await;
    assert!(matches!(outcome, FetchOutcome::Empty));
}

#[tokio::test]
async fn test_short_page_is_empty() {
    let (server, base_url) = start_server().await;

    Mock::given(method("GET"))
        .and(path("/stub-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_string(telegraph_page("Stub", "Hello")))
        .mount(&server)
        .await;

    let outcome = fetcher().fetch(&format!("{}/stub-06-01", base_url)).await;
    assert!(matches!(outcome, FetchOutcome::Empty));
}

#[tokio::test]
async fn test_denylisted_page_is_empty() {
    let (server, base_url) = start_server().await;

    let article = format!("{} Download it from mdisk today.", ARTICLE);
    Mock::given(method("GET"))
        .and(path("/promo-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_string(telegraph_page("Promo", &article)))
        .mount(&server)
        .await;

    let outcome = fetcher().fetch(&format!("{}/promo-06-01", base_url)).await;
    assert!(matches!(outcome, FetchOutcome::Empty));
}

#[tokio::test]
async fn test_slow_response_is_transient() {
    let (server, base_url) = start_server().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(telegraph_page("Slow", ARTICLE))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.search.request_timeout_secs = 1;
    let fetcher = HttpFetcher::from_config(&config).expect("Failed to build fetcher");

    let outcome = fetcher.fetch(&format!("{}/slow-06-01", base_url)).await;
    assert!(matches!(outcome, FetchOutcome::Transient(_)));
}

#[tokio::test]
async fn test_check_one() {
    let (server, base_url) = start_server().await;

    Mock::given(method("GET"))
        .and(path("/diary-02-14"))
        .respond_with(ResponseTemplate::new(200).set_body_string(telegraph_page("Diary", ARTICLE)))
        .mount(&server)
        .await;

    let url = format!("{}/diary-02-14", base_url);
    let hit = check_one(&fetcher(), &url).await.expect("check failed");
    assert_eq!(hit.map(|h| h.to_string()), Some(format!("Diary - {}", url)));

    let missing = check_one(&fetcher(), &format!("{}/diary-02-15", base_url))
        .await
        .expect("check failed");
    assert!(missing.is_none());
}
