//! Telegram bot flows against a mock server
//!
//! One mock server plays both the Bot API (`POST /bot{token}/...`) and
//! Telegraph (`GET /{slug}`).

use crate::{start_server, telegraph_page, ARTICLE};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use telegraph_finder::bot::{Bot, BotApi, BotError, Chat, Message};
use telegraph_finder::config::{BotConfig, Config, SearchConfig};
use telegraph_finder::crawler::HttpFetcher;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "123:abc";

fn bot_config(uri: &str) -> Config {
    Config {
        search: SearchConfig {
            max_concurrent_requests: 1,
            request_timeout_secs: 5,
            retry_count: 0,
            retry_delay_ms: 0,
            request_delay_ms: 0,
            months: vec![6],
            max_index: 1,
            base_url: uri.to_string(),
            ..SearchConfig::default()
        },
        bot: BotConfig {
            token: TOKEN.to_string(),
            api_url: uri.to_string(),
            poll_timeout_secs: 1,
            chunk_size: 2,
            progress_interval_secs: 1,
        },
        ..Config::default()
    }
}

fn bot(config: Config) -> Bot {
    let fetcher = Arc::new(HttpFetcher::from_config(&config).expect("Failed to build fetcher"));
    let api = BotApi::from_config(&config.bot).expect("Failed to build Bot API client");
    Bot::new(api, config, fetcher)
}

fn message(text: &str) -> Message {
    Message {
        message_id: 1,
        chat: Chat { id: 42 },
        text: Some(text.to_string()),
    }
}

async fn mount_bot_api(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": { "message_id": 10, "chat": { "id": 42 }, "text": "" }
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/bot{}/editMessageText", TOKEN)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": true })),
        )
        .mount(server)
        .await;
}

/// Texts posted to one Bot API method, in the order they arrived
async fn posted_texts(server: &MockServer, api_method: &str) -> Vec<String> {
    let suffix = format!("/{}", api_method);
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path().ends_with(&suffix))
        .filter_map(|request| {
            let body: Value = serde_json::from_slice(&request.body).ok()?;
            body["text"].as_str().map(str::to_string)
        })
        .collect()
}

async fn polled_offsets(server: &MockServer) -> Vec<i64> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path().ends_with("/getUpdates"))
        .filter_map(|request| {
            let body: Value = serde_json::from_slice(&request.body).ok()?;
            body["offset"].as_i64()
        })
        .collect()
}

#[tokio::test]
async fn test_search_command_sends_links_in_chunks() {
    let (server, uri) = start_server().await;
    mount_bot_api(&server).await;
    for slug in ["/test-06-01", "/test-06-05", "/test-06-09"] {
        Mock::given(method("GET"))
            .and(path(slug))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(telegraph_page("Found", ARTICLE)),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let bot = bot(bot_config(&uri));
    bot.handle_message(message("/p test"), &CancellationToken::new())
        .await
        .expect("Search should be answered");

    let sent = posted_texts(&server, "sendMessage").await;
    assert_eq!(
        sent,
        vec![
            "Starting...".to_string(),
            format!("{0}/test-06-01\n{0}/test-06-05", uri),
            format!("{}/test-06-09", uri),
            "Found 3 links".to_string(),
        ]
    );

    let edits = posted_texts(&server, "editMessageText").await;
    let last = edits.last().expect("Status message should be edited");
    assert!(last.starts_with("Finished \"test\""));
    assert!(last.ends_with("31/31 (100%)"));
}

#[tokio::test]
async fn test_search_without_results_reports_zero() {
    let (server, uri) = start_server().await;
    mount_bot_api(&server).await;

    let bot = bot(bot_config(&uri));
    bot.handle_message(message("/p nothing here"), &CancellationToken::new())
        .await
        .unwrap();

    let sent = posted_texts(&server, "sendMessage").await;
    assert_eq!(sent, vec!["Starting...", "Found 0 links"]);
}

#[tokio::test]
async fn test_unsearchable_query_is_reported() {
    let (server, uri) = start_server().await;
    mount_bot_api(&server).await;

    let bot = bot(bot_config(&uri));
    bot.handle_message(message("/p !!!"), &CancellationToken::new())
        .await
        .unwrap();

    let edits = posted_texts(&server, "editMessageText").await;
    assert_eq!(edits.len(), 1);
    assert!(edits[0].starts_with("Cannot search"));

    let page_requests = server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| !request.url.path().starts_with("/bot"))
        .count();
    assert_eq!(page_requests, 0);
}

#[tokio::test]
async fn test_usage_and_plain_text() {
    let (server, uri) = start_server().await;
    mount_bot_api(&server).await;

    let bot = bot(bot_config(&uri));
    let cancel = CancellationToken::new();
    bot.handle_message(message("/p"), &cancel).await.unwrap();
    bot.handle_message(message("just chatting"), &cancel)
        .await
        .unwrap();

    let sent = posted_texts(&server, "sendMessage").await;
    assert_eq!(sent, vec!["Usage: /p <query>"]);
}

#[tokio::test]
async fn test_run_answers_updates_until_cancelled() {
    let (server, uri) = start_server().await;
    mount_bot_api(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("/bot{}/getUpdates", TOKEN)))
        .and(body_partial_json(json!({ "offset": 0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": [{
                "update_id": 5,
                "message": { "message_id": 1, "chat": { "id": 42 }, "text": "/start" }
            }]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/getUpdates", TOKEN)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": true, "result": [] }))
                .set_delay(Duration::from_millis(50)),
        )
        .mount(&server)
        .await;

    let bot = bot(bot_config(&uri));
    let cancel = CancellationToken::new();
    let running = {
        let cancel = cancel.clone();
        tokio::spawn(async move { bot.run(&cancel).await })
    };

    let mut answered = false;
    for _ in 0..100 {
        let helped = !posted_texts(&server, "sendMessage").await.is_empty();
        let acknowledged = polled_offsets(&server).await.contains(&6);
        if helped && acknowledged {
            answered = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(answered, "Bot should answer /start and move the offset past it");

    cancel.cancel();
    let result = tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .expect("Bot should stop after cancellation")
        .unwrap();
    assert!(result.is_ok());

    let sent = posted_texts(&server, "sendMessage").await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("/p <query>"));
}

#[tokio::test]
async fn test_run_stops_when_token_is_rejected() {
    let (server, uri) = start_server().await;

    Mock::given(method("POST"))
        .and(path(format!("/bot{}/getUpdates", TOKEN)))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "ok": false,
            "error_code": 401,
            "description": "Unauthorized"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let bot = bot(bot_config(&uri));
    let result = bot.run(&CancellationToken::new()).await;

    match result {
        Err(BotError::Api { description, .. }) => assert_eq!(description, "Unauthorized"),
        other => panic!("Expected the poll to be rejected, got {:?}", other),
    }
}
