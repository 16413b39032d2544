//! Credential-like pair extraction

use crate::classify::{Account, Classifier, Finding};
use regex::Regex;
use std::sync::LazyLock;

static RE_EMAIL_PASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,})[\s:]+([^\s]{3,})").unwrap()
});
static RE_MINECRAFT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(minecraft|mc)[\s:]*([^\s:@]+)[\s:]+([^\s]{3,})").unwrap());
static RE_LABELLED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(account|login|username|user|email)[\s:]+([^\s]+)[\s:]+.*(password|pass|pwd)[\s:]+([^\s]{3,})",
    )
    .unwrap()
});

/// Finds `email:password`, Minecraft and labelled `user ... password` pairs
///
/// Patterns are applied independently, so one line may yield more than one
/// finding.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountClassifier;

impl AccountClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl Classifier for AccountClassifier {
    fn name(&self) -> &'static str {
        "accounts"
    }

    fn classify(&self, page_text: &str, source_url: &str) -> Vec<Finding> {
        let account = |kind: &str, username: &str, password: &str| {
            Finding::Account(Account {
                kind: kind.to_string(),
                username: username.to_string(),
                password: password.to_string(),
                source: source_url.to_string(),
            })
        };

        let mut findings = Vec::new();

        for cap in RE_EMAIL_PASS.captures_iter(page_text) {
            findings.push(account("email", &cap[1], &cap[2]));
        }

        for cap in RE_MINECRAFT.captures_iter(page_text) {
            findings.push(account("minecraft", &cap[2], &cap[3]));
        }

        for cap in RE_LABELLED.captures_iter(page_text) {
            findings.push(account(&cap[1].to_lowercase(), &cap[2], &cap[4]));
        }

        findings
    }
}
