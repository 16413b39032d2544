//! Integration tests for Telegraph-Finder
//!
//! These tests use wiremock to stand in for Telegraph and exercise the HTTP
//! fetcher, full search runs and the Telegram bot end-to-end.

mod bot_tests;
mod fetch_tests;
mod search_tests;

use wiremock::MockServer;

/// Article text comfortably above the default minimum length
pub const ARTICLE: &str =
    "This is a genuine Telegraph article with enough text to count as real content.";

/// Builds a Telegraph-like page
pub fn telegraph_page(title: &str, article: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><title>{}</title></head><body>
        <div class="tl_page"><article id="_tl_editor">{}</article></div>
        </body></html>"#,
        title, article
    )
}

/// Mock server URI, usable as a base URL
pub async fn start_server() -> (MockServer, String) {
    let server = MockServer::start().await;
    let uri = server.uri();
    (server, uri)
}
