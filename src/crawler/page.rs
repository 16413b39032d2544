//! HTML page validation
//!
//! Telegraph answers many guessed slugs with a 200 status and a placeholder
//! page, so a successful response is not enough. This module parses a page and
//! decides whether it carries real content:
//! - the `<title>` must not be blank or a known not-found title
//! - the text inside `<article>` must reach a minimum length
//! - the page markup must not contain any denylisted substring

use crate::config::FilterConfig;
use scraper::{Html, Selector};
use std::fmt;

/// A page that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Trimmed page title
    pub title: String,

    /// The URL the page was fetched from
    pub url: String,

    /// Text content of the article region
    pub text: String,
}

/// Rules a page must satisfy to count as a hit
#[derive(Debug, Clone)]
pub struct PageRules {
    pub denylist: Vec<String>,
    pub not_found_titles: Vec<String>,
    pub min_content_length: usize,
}

impl Default for PageRules {
    fn default() -> Self {
        Self::from(&FilterConfig::default())
    }
}

impl From<&FilterConfig> for PageRules {
    fn from(config: &FilterConfig) -> Self {
        Self {
            denylist: config.denylist.clone(),
            not_found_titles: config.not_found_titles.clone(),
            min_content_length: config.min_content_length,
        }
    }
}

/// Why a page was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Title missing, blank, or one of the not-found titles
    NotFound,

    /// Article text shorter than the minimum (character count)
    TooShort(usize),

    /// Markup contains this denylisted substring
    Denylisted(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not-found page"),
            Self::TooShort(len) => write!(f, "content too short ({} chars)", len),
            Self::Denylisted(entry) => write!(f, "denylisted content '{}'", entry),
        }
    }
}

/// Extracted parts of an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from the first <title> tag), trimmed
    pub title: Option<String>,

    /// Concatenated text of all <article> elements
    pub article_text: String,

    /// The document serialized back to HTML
    pub markup: String,
}

/// Parses HTML content into the parts page validation looks at
///
/// Malformed HTML never fails: the parser recovers the same way browsers do.
pub fn parse_page(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        article_text: extract_article_text(&document),
        markup: document.html(),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts the text of every <article> element
fn extract_article_text(document: &Html) -> String {
    let Ok(article_selector) = Selector::parse("article") else {
        return String::new();
    };

    document
        .select(&article_selector)
        .flat_map(|element| element.text())
        .collect()
}

/// Validates a fetched page body
///
/// # Returns
///
/// * `Ok(Page)` - The page holds real, allowed content
/// * `Err(Rejection)` - The reason the page does not count as a hit
///
/// # Example
///
/// ```
/// use telegraph_finder::crawler::{validate_page, PageRules, Rejection};
///
/// let html = "<html><head><title>Telegraph</title></head><body></body></html>";
/// let result = validate_page(html, "https://telegra.ph/x-01-01", &PageRules::default());
/// assert_eq!(result, Err(Rejection::NotFound));
/// ```
pub fn validate_page(html: &str, url: &str, rules: &PageRules) -> Result<Page, Rejection> {
    let parsed = parse_page(html);

    let title = match parsed.title {
        Some(title) if !rules.not_found_titles.iter().any(|t| *t == title) => title,
        _ => return Err(Rejection::NotFound),
    };

    let text = parsed.article_text.trim();
    let length = text.chars().count();
    if length < rules.min_content_length {
        return Err(Rejection::TooShort(length));
    }

    if let Some(entry) = rules
        .denylist
        .iter()
        .find(|entry| parsed.markup.contains(entry.as_str()))
    {
        return Err(Rejection::Denylisted(entry.clone()));
    }

    Ok(Page {
        title,
        url: url.to_string(),
        text: text.to_string(),
    })
}
