//! Webhook URL extraction

use crate::classify::{Classifier, Finding, Webhook, WebhookKind};
use regex::Regex;
use std::sync::LazyLock;

static RE_DISCORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"https?://(?:(?:canary|ptb)\.)?discord(?:app)?\.com/api/webhooks/([0-9]{17,20})/([A-Za-z0-9\-_]{60,68})",
    )
    .unwrap()
});
static RE_GITHUB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://api\.github\.com/repos/[^/]+/[^/]+/hooks/[0-9]+\?token=([A-Za-z0-9_\-]+)")
        .unwrap()
});
static RE_SLACK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://hooks\.slack\.com/services/T[a-zA-Z0-9_]+/B[a-zA-Z0-9_]+/[a-zA-Z0-9_]+")
        .unwrap()
});
static RE_GENERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"webhook[s]?[\s:=]+(https?://[a-zA-Z0-9\.\-_/\?=&%]+)").unwrap()
});

struct ProviderPattern {
    kind: WebhookKind,
    regex: &'static LazyLock<Regex>,
}

const PROVIDER_PATTERNS: &[ProviderPattern] = &[
    ProviderPattern {
        kind: WebhookKind::Discord,
        regex: &RE_DISCORD,
    },
    ProviderPattern {
        kind: WebhookKind::GitHub,
        regex: &RE_GITHUB,
    },
    ProviderPattern {
        kind: WebhookKind::Slack,
        regex: &RE_SLACK,
    },
];

/// Finds Discord, GitHub and Slack webhook URLs, plus any URL labelled
/// `webhook:`
///
/// A labelled URL that contains, or is contained in, an already-found URL is
/// not reported a second time as generic.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebhookClassifier;

impl WebhookClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl Classifier for WebhookClassifier {
    fn name(&self) -> &'static str {
        "webhooks"
    }

    fn classify(&self, page_text: &str, source_url: &str) -> Vec<Finding> {
        let mut webhooks: Vec<Webhook> = Vec::new();

        for pattern in PROVIDER_PATTERNS {
            for found in pattern.regex.find_iter(page_text) {
                webhooks.push(Webhook {
                    kind: pattern.kind,
                    url: found.as_str().to_string(),
                    source: source_url.to_string(),
                });
            }
        }

        for cap in RE_GENERIC.captures_iter(page_text) {
            let url = &cap[1];
            let overlaps = webhooks
                .iter()
                .any(|known| url.contains(known.url.as_str()) || known.url.contains(url));

            if !overlaps {
                webhooks.push(Webhook {
                    kind: WebhookKind::Generic,
                    url: url.to_string(),
                    source: source_url.to_string(),
                });
            }
        }

        webhooks.into_iter().map(Finding::Webhook).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "https://telegra.ph/hooks-06-01";

    fn webhooks(text: &str) -> Vec<Webhook> {
        WebhookClassifier::new()
            .classify(text, SOURCE)
            .into_iter()
            .filter_map(|finding| match finding {
                Finding::Webhook(webhook) => Some(webhook),
                Finding::Account(_) => None,
            })
            .collect()
    }

    fn discord_url() -> String {
        format!(
            "https://discord.com/api/webhooks/{}/{}",
            "123456789012345678",
            "a".repeat(64)
        )
    }

    #[test]
    fn test_discord_webhook() {
        let text = format!("send logs to {} please", discord_url());
        let found = webhooks(&text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, WebhookKind::Discord);
        assert_eq!(found[0].url, discord_url());
        assert_eq!(found[0].source, SOURCE);
    }

    #[test]
    fn test_discord_token_too_short() {
        let text = "https://discord.com/api/webhooks/123456789012345678/shorttoken";
        assert!(webhooks(text).is_empty());
    }

    #[test]
    fn test_github_webhook() {
        let url = "https://api.github.com/repos/acme/widgets/hooks/42?token=abc_DEF-123";
        let found = webhooks(&format!("hook {}", url));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, WebhookKind::GitHub);
        assert_eq!(found[0].url, url);
    }

    #[test]
    fn test_slack_webhook() {
        let url = "https://hooks.slack.com/services/T0001/B0002/XXXXyyyyZZZZ";
        let found = webhooks(url);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, WebhookKind::Slack);
        assert_eq!(found[0].url, url);
    }

    #[test]
    fn test_generic_webhook() {
        let found = webhooks("webhook: https://example.com/notify?id=7");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, WebhookKind::Generic);
        assert_eq!(found[0].url, "https://example.com/notify?id=7");
    }

    #[test]
    fn test_generic_overlapping_known_url_is_dropped() {
        let url = "https://hooks.slack.com/services/T0001/B0002/XXXXyyyyZZZZ";
        let found = webhooks(&format!("webhook: {}", url));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, WebhookKind::Slack);
    }

    #[test]
    fn test_duplicate_generic_is_dropped() {
        let text = "webhooks=https://example.com/a and webhook: https://example.com/a";
        let found = webhooks(text);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_plain_text_has_no_findings() {
        assert!(webhooks("See https://example.com for details.").is_empty());
    }
}
