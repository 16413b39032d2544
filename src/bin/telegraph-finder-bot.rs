//! Telegram bot serving Telegraph-Finder searches
//!
//! Long-polls the Bot API and answers `/p <query>` with the pages found.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use telegraph_finder::bot::{Bot, BotApi};
use telegraph_finder::config::{load_config_with_hash, validate, validate_bot_config, Config};
use telegraph_finder::crawler::HttpFetcher;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted when no token is given on the command line
const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Telegram front end for Telegraph-Finder
#[derive(Parser, Debug)]
#[command(name = "telegraph-finder-bot")]
#[command(version)]
#[command(about = "Serves Telegraph-Finder searches over Telegram", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Bot token; overrides the config file and TELEGRAM_BOT_TOKEN
    #[arg(long, value_name = "TOKEN")]
    token: Option<String>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("telegraph_finder=info,warn"),
        1 => EnvFilter::new("telegraph_finder=debug,info"),
        _ => EnvFilter::new("telegraph_finder=trace,debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut config = match &cli.config {
        Some(path) => {
            let (config, hash) = load_config_with_hash(path).with_context(|| {
                format!("Failed to load configuration from {}", path.display())
            })?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(token) = cli.token.clone().or_else(|| std::env::var(TOKEN_ENV).ok()) {
        config.bot.token = token;
    }

    validate(&config).context("Invalid settings")?;
    validate_bot_config(&config.bot).context("Invalid bot settings")?;

    let fetcher =
        Arc::new(HttpFetcher::from_config(&config).context("Failed to build HTTP client")?);
    let api = BotApi::from_config(&config.bot).context("Failed to build Bot API client")?;
    let bot = Bot::new(api, config, fetcher);

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing running searches");
            interrupt.cancel();
        }
    });

    bot.run(&cancel).await.context("Bot stopped")?;
    tracing::info!("Bot stopped");

    Ok(())
}
