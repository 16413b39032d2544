//! Command handling and the polling loop

use crate::bot::api::{BotApi, Message};
use crate::bot::{BotError, BotResult};
use crate::config::Config;
use crate::crawler::{search, Fetcher, ProgressCallback, ResultSet};
use crate::output::progress_line;
use crate::FinderError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

/// Longest text Telegram accepts in one message
pub const MESSAGE_LIMIT: usize = 4096;

/// Pause before polling again after a network failure
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

const HELP_TEXT: &str = "Send /p <query> to search Telegraph for pages titled after the query.\n\
    Every date slug of the year is checked, so a search takes a while.";

const USAGE_TEXT: &str = "Usage: /p <query>";

/// A bot command parsed from a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/p <query>`
    Search(String),
    /// `/start` or `/help`
    Help,
    /// `/p` without a query
    Usage,
}

/// Parses a message text; anything that is not a known command is `None`
///
/// Accepts the `/p@BotName query` form Telegram uses in group chats.
pub fn parse_command(text: &str) -> Option<Command> {
    let text = text.trim();
    let (head, rest) = match text.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (text, ""),
    };

    let name = head.strip_prefix('/')?;
    let name = name.split_once('@').map_or(name, |(name, _)| name);

    match name {
        "p" if rest.is_empty() => Some(Command::Usage),
        "p" => Some(Command::Search(rest.to_string())),
        "start" | "help" => Some(Command::Help),
        _ => None,
    }
}

/// Splits the found URLs into newline-joined messages
///
/// A message holds at most `chunk_size` links and never exceeds
/// [`MESSAGE_LIMIT`] bytes.
pub fn chunk_links(results: &ResultSet, chunk_size: usize) -> Vec<String> {
    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for hit in results.iter() {
        let full = count == chunk_size || current.len() + 1 + hit.url.len() > MESSAGE_LIMIT;
        if count > 0 && full {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }

        if count > 0 {
            current.push('\n');
        }
        current.push_str(&hit.url);
        count += 1;
    }

    if count > 0 {
        chunks.push(current);
    }
    chunks
}

/// Text of the status message while a search runs
pub fn progress_text(query: &str, completed: usize, total: usize) -> String {
    format!(
        "Searching \"{}\"\n{}",
        query,
        progress_line("Checked", completed, total)
    )
}

fn finished_text(query: &str, completed: usize, total: usize) -> String {
    format!(
        "Finished \"{}\"\n{}",
        query,
        progress_line("Checked", completed, total)
    )
}

/// Telegram bot answering `/p <query>` with the pages a search finds
#[derive(Clone)]
pub struct Bot {
    api: Arc<BotApi>,
    config: Arc<Config>,
    fetcher: Arc<dyn Fetcher>,
}

impl Bot {
    pub fn new(api: BotApi, config: Config, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            api: Arc::new(api),
            config: Arc::new(config),
            fetcher,
        }
    }

    /// Polls for updates until `cancel` fires or the Bot API rejects the poll
    ///
    /// Every message is handled in its own task, so several searches may run
    /// at once. On return all of them have finished; a cancelled search still
    /// sends the links it found.
    pub async fn run(&self, cancel: &CancellationToken) -> BotResult<()> {
        let run_token = cancel.child_token();
        let mut handlers = JoinSet::new();
        let mut offset: i64 = 0;
        let mut failure = None;

        tracing::info!("Bot is polling for updates");

        loop {
            let polled = tokio::select! {
                biased;
                _ = run_token.cancelled() => break,
                polled = self.api.get_updates(offset, self.config.bot.poll_timeout()) => polled,
            };

            while let Some(joined) = handlers.try_join_next() {
                log_handler_result(joined);
            }

            let updates = match polled {
                Ok(updates) => updates,
                Err(BotError::Http(e)) => {
                    tracing::warn!("Polling failed, retrying: {}", e);
                    tokio::select! {
                        biased;
                        _ = run_token.cancelled() => break,
                        _ = tokio::time::sleep(POLL_RETRY_DELAY) => continue,
                    }
                }
                Err(e) => {
                    tracing::error!("Polling rejected: {}", e);
                    failure = Some(e);
                    run_token.cancel();
                    break;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                let Some(message) = update.message else {
                    continue;
                };

                let bot = self.clone();
                let token = run_token.clone();
                handlers.spawn(async move { bot.handle_message(message, &token).await });
            }
        }

        while let Some(joined) = handlers.join_next().await {
            log_handler_result(joined);
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Answers one message
    pub async fn handle_message(
        &self,
        message: Message,
        cancel: &CancellationToken,
    ) -> BotResult<()> {
        let Some(text) = message.text.as_deref() else {
            return Ok(());
        };
        let chat_id = message.chat.id;

        match parse_command(text) {
            None => Ok(()),
            Some(Command::Help) => {
                self.api.send_message(chat_id, HELP_TEXT).await?;
                Ok(())
            }
            Some(Command::Usage) => {
                self.api.send_message(chat_id, USAGE_TEXT).await?;
                Ok(())
            }
            Some(Command::Search(query)) => self.run_search(chat_id, &query, cancel).await,
        }
    }

    async fn run_search(
        &self,
        chat_id: i64,
        query: &str,
        cancel: &CancellationToken,
    ) -> BotResult<()> {
        tracing::info!("Chat {} asked for '{}'", chat_id, query);
        let status = self.api.send_message(chat_id, "Starting...").await?;

        let (progress_tx, progress_rx) = watch::channel((0usize, 0usize));
        let on_progress: ProgressCallback = Arc::new(move |completed: usize, total: usize| {
            let _ = progress_tx.send((completed, total));
        });
        let relay = tokio::spawn(relay_progress(
            self.api.clone(),
            chat_id,
            status.message_id,
            query.to_string(),
            progress_rx.clone(),
            self.config.bot.progress_interval(),
        ));

        let outcome = search(
            query,
            &self.config.search,
            self.fetcher.clone(),
            cancel,
            Some(on_progress),
        )
        .await;

        relay.abort();
        let _ = relay.await;

        let report = match outcome {
            Ok(report) => report,
            Err(e) => {
                let text = format!("Cannot search: {}", e);
                self.api
                    .edit_message_text(chat_id, status.message_id, &text)
                    .await?;
                return Ok(());
            }
        };

        let (completed, _) = *progress_rx.borrow();
        let text = finished_text(query, completed, report.total_candidates);
        self.api
            .edit_message_text(chat_id, status.message_id, &text)
            .await?;

        for chunk in chunk_links(&report.results, self.config.bot.chunk_size) {
            self.api.send_message(chat_id, &chunk).await?;
        }

        match &report.error {
            None => {}
            Some(FinderError::Cancelled) => {
                let text = "Search was interrupted; these are the links found so far.";
                self.api.send_message(chat_id, text).await?;
            }
            Some(e) => {
                let text = format!("Search stopped early: {}", e);
                self.api.send_message(chat_id, &text).await?;
            }
        }

        let found = report.results.len();
        self.api
            .send_message(chat_id, &format!("Found {} links", found))
            .await?;
        tracing::info!("Search for '{}' finished with {} links", query, found);

        Ok(())
    }
}

/// Edits the status message with the latest progress, at most once per `interval`
async fn relay_progress(
    api: Arc<BotApi>,
    chat_id: i64,
    message_id: i64,
    query: String,
    mut progress: watch::Receiver<(usize, usize)>,
    interval: Duration,
) {
    while progress.changed().await.is_ok() {
        let (completed, total) = *progress.borrow_and_update();
        let text = progress_text(&query, completed, total);
        if let Err(e) = api.edit_message_text(chat_id, message_id, &text).await {
            tracing::debug!("Progress update failed: {}", e);
        }
        tokio::time::sleep(interval).await;
    }
}

fn log_handler_result(joined: Result<BotResult<()>, JoinError>) {
    match joined {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!("Failed to answer a message: {}", e),
        Err(e) => tracing::error!("Message handler panicked: {}", e),
    }
}
