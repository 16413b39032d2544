//! Result aggregation
//!
//! Workers record hits concurrently; the aggregator keeps them in the order
//! they were committed and hands the caller an immutable [`ResultSet`] once
//! every worker has joined.

use crate::crawler::page::Page;
use serde::Serialize;
use std::fmt;
use std::sync::Mutex;

/// A candidate URL confirmed to host genuine content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hit {
    pub title: String,
    pub url: String,
}

impl From<&Page> for Hit {
    fn from(page: &Page) -> Self {
        Self {
            title: page.title.clone(),
            url: page.url.clone(),
        }
    }
}

impl fmt::Display for Hit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.title, self.url)
    }
}

/// Thread-safe append-only collector
#[derive(Debug)]
pub struct Aggregator<T> {
    items: Mutex<Vec<T>>,
}

impl<T> Default for Aggregator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Aggregator<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }

    /// Appends one item; commit order is preserved
    pub fn record(&self, item: T) {
        // Poisoning is ignored: a push never leaves the Vec half-updated
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.push(item);
    }

    /// Appends several items as one contiguous block
    pub fn record_all(&self, batch: impl IntoIterator<Item = T>) {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.extend(batch);
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the aggregator and returns everything recorded
    pub fn into_inner(self) -> Vec<T> {
        self.items.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T: Clone> Aggregator<T> {
    /// Copies the current contents
    ///
    /// Meant to be called after all producers have finished.
    pub fn snapshot(&self) -> Vec<T> {
        self.items.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

/// Hits found by a search, in commit order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResultSet {
    hits: Vec<Hit>,
}

impl ResultSet {
    pub fn new(hits: Vec<Hit>) -> Self {
        Self { hits }
    }

    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Hit> {
        self.hits.iter()
    }

    /// Display strings (`"{title} - {url}"`) of every hit
    pub fn display_lines(&self) -> Vec<String> {
        self.hits.iter().map(Hit::to_string).collect()
    }

    pub fn into_vec(self) -> Vec<Hit> {
        self.hits
    }
}

impl From<Aggregator<Hit>> for ResultSet {
    fn from(aggregator: Aggregator<Hit>) -> Self {
        Self::new(aggregator.into_inner())
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Hit;
    type IntoIter = std::slice::Iter<'a, Hit>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.iter()
    }
}
