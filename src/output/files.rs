//! Result files
//!
//! Every list is written twice: a numbered plain-text file for reading and a
//! `.json` sibling for tooling.

use crate::classify::Finding;
use crate::crawler::{Hit, ResultSet};
use crate::output::OutputResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// JSON document written next to the hit list
#[derive(Debug, Clone, Serialize)]
pub struct HitReport<'a> {
    pub query: &'a str,
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    pub hits: &'a [Hit],
}

/// Appends a suffix to a file name (`results.txt` + `.json` -> `results.txt.json`)
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Formats hits as numbered lines: `N. title - url`
pub fn format_hits(results: &ResultSet) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, hit)| format!("{}. {}\n", i + 1, hit))
        .collect()
}

/// Formats findings as numbered lines
///
/// Accounts render as `N. [kind] user:pass (source)` and webhooks as
/// `N. [kind] url (source)`.
pub fn format_findings<'a>(findings: impl IntoIterator<Item = &'a Finding>) -> String {
    findings
        .into_iter()
        .enumerate()
        .map(|(i, finding)| format!("{}. {}\n", i + 1, finding))
        .collect()
}

/// Keeps findings that pass a kind filter (`all` or an empty filter keeps everything)
pub fn filter_findings<'a>(
    findings: impl IntoIterator<Item = &'a Finding>,
    kind: &str,
) -> Vec<&'a Finding> {
    findings
        .into_iter()
        .filter(|finding| finding.matches_kind(kind))
        .collect()
}

/// Writes hits to `path` and a JSON report to `path.json`
///
/// # Arguments
///
/// * `path` - Text output path
/// * `query` - The query that produced the hits
/// * `results` - Hits to write
///
/// # Returns
///
/// * `Ok(())` - Both files were written
/// * `Err(OutputError)` - A file could not be created or written
pub fn write_hits(path: &Path, query: &str, results: &ResultSet) -> OutputResult<()> {
    write_text(path, &format_hits(results))?;

    let report = HitReport {
        query,
        generated_at: Utc::now(),
        total: results.len(),
        hits: results.hits(),
    };
    write_json(&with_suffix(path, ".json"), &report)?;

    tracing::info!("Saved {} hits to {}", results.len(), path.display());
    Ok(())
}

/// Writes findings to `path` and their JSON array to `path.json`
pub fn write_findings(path: &Path, findings: &[&Finding]) -> OutputResult<()> {
    write_text(path, &format_findings(findings.iter().copied()))?;
    write_json(&with_suffix(path, ".json"), &findings)?;

    tracing::info!("Saved {} findings to {}", findings.len(), path.display());
    Ok(())
}

fn write_text(path: &Path, contents: &str) -> OutputResult<()> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())?;
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> OutputResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
