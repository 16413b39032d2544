//! Telegram bot front end
//!
//! This module handles:
//! - Talking to the Telegram Bot API over long polling
//! - Turning `/p <query>` messages into searches
//! - Reporting progress by editing one status message
//! - Sending the found links back in chunks

mod api;
mod handler;

pub use api::{BotApi, Chat, Message, Update};
pub use handler::{chunk_links, parse_command, progress_text, Bot, Command, MESSAGE_LIMIT};

use thiserror::Error;

/// Errors that can occur while serving the bot
#[derive(Debug, Error)]
pub enum BotError {
    #[error("Bot API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bot API method {method} failed: {description}")]
    Api { method: String, description: String },
}

/// Result type for bot operations
pub type BotResult<T> = Result<T, BotError>;
