//! Content classification
//!
//! Classifiers scan the article text of a confirmed page and extract findings:
//! credential-like pairs and webhook URLs. Each classifier is a plain
//! [`Classifier`] implementation; [`analyze`] runs a set of them over every hit
//! of a search.

mod accounts;
mod analyze;
mod webhooks;

pub use accounts::AccountClassifier;
pub use analyze::{analyze, AnalysisReport};
pub use webhooks::WebhookClassifier;

use serde::Serialize;
use std::fmt;

/// Extracts findings from page text
pub trait Classifier: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Scans `page_text` and returns every finding, tagged with `source_url`
    fn classify(&self, page_text: &str, source_url: &str) -> Vec<Finding>;
}

/// A credential-like pair found on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    /// Account family: `email`, `minecraft`, or the label it was found under
    pub kind: String,
    pub username: String,
    pub password: String,
    pub source: String,
}

/// Known webhook providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookKind {
    Discord,
    GitHub,
    Slack,
    Generic,
}

impl WebhookKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discord => "discord",
            Self::GitHub => "github",
            Self::Slack => "slack",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for WebhookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A webhook URL found on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Webhook {
    pub kind: WebhookKind,
    pub url: String,
    pub source: String,
}

/// Anything a classifier can report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Finding {
    Account(Account),
    Webhook(Webhook),
}

impl Finding {
    /// The finding's kind, e.g. `email` or `discord`
    pub fn kind(&self) -> &str {
        match self {
            Self::Account(account) => &account.kind,
            Self::Webhook(webhook) => webhook.kind.as_str(),
        }
    }

    /// URL of the page the finding came from
    pub fn source(&self) -> &str {
        match self {
            Self::Account(account) => &account.source,
            Self::Webhook(webhook) => &webhook.source,
        }
    }

    pub fn is_account(&self) -> bool {
        matches!(self, Self::Account(_))
    }

    pub fn is_webhook(&self) -> bool {
        matches!(self, Self::Webhook(_))
    }

    /// Whether the finding passes a kind filter
    ///
    /// An empty filter or `all` matches everything; otherwise kinds are
    /// compared case-insensitively.
    pub fn matches_kind(&self, filter: &str) -> bool {
        let filter = filter.trim();
        filter.is_empty() || filter.eq_ignore_ascii_case("all") || filter.eq_ignore_ascii_case(self.kind())
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account(a) => write!(f, "[{}] {}:{} ({})", a.kind, a.username, a.password, a.source),
            Self::Webhook(w) => write!(f, "[{}] {} ({})", w.kind, w.url, w.source),
        }
    }
}
