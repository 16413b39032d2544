//! Output module for saving and displaying results
//!
//! This module handles:
//! - Writing hits as a numbered text list plus a JSON report
//! - Writing classifier findings, filtered by kind
//! - Rendering the terminal progress line

mod files;
mod progress;

pub use files::{
    filter_findings, format_findings, format_hits, with_suffix, write_findings, write_hits,
    HitReport,
};
pub use progress::{progress_line, render_progress_bar, PROGRESS_BAR_WIDTH};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
