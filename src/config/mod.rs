//! Configuration module for Telegraph-Finder
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every setting has a default, so the file is optional and command-line flags
//! may override individual values before a run starts.
//!
//! # Example
//!
//! ```no_run
//! use telegraph_finder::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("finder.toml")).unwrap();
//! println!("Searching months: {:?}", config.search.effective_months());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    AnalysisConfig, BotConfig, Config, FilterConfig, SearchConfig, DEFAULT_BASE_URL,
    DEFAULT_BOT_API_URL, DEFAULT_DENYLIST, DEFAULT_NOT_FOUND_TITLES,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate, validate_bot_config, validate_search_config};
