use serde::Deserialize;
use std::time::Duration;

/// Junk and spam markers; pages containing any of these are never reported
pub const DEFAULT_DENYLIST: &[&str] = &[
    "https://t.me/SLlV_INTIM_BOT",
    "https://t.me/+YztOEovieQIzZjY8",
    "free vpn infinite time",
    "mdisk",
    "free exploits",
    "http://openroadmdnzgrna5lzkkjlqvc662o4xbgsjqi22qjek6adq4j6emaad.onion/",
];

/// Titles Telegraph serves with a 200 status for pages that do not exist
pub const DEFAULT_NOT_FOUND_TITLES: &[&str] = &["404 Not Found", "Telegraph"];

pub const DEFAULT_BASE_URL: &str = "https://telegra.ph";

pub const DEFAULT_BOT_API_URL: &str = "https://api.telegram.org";

/// Main configuration structure for Telegraph-Finder
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub bot: BotConfig,
}

/// Search run tunables
///
/// Built once before a run and shared read-only between all tasks.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SearchConfig {
    /// Maximum number of HTTP requests in flight at once
    pub max_concurrent_requests: u32,

    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,

    /// How many times a transient failure is retried
    pub retry_count: u32,

    /// Delay between retries of one candidate (milliseconds)
    pub retry_delay_ms: u64,

    /// Delay every task waits after admission, before its request (milliseconds)
    pub request_delay_ms: u64,

    /// Months to search (1-12); empty means all twelve
    pub months: Vec<u32>,

    /// Also search the transliterated form of the query
    pub transliterate: bool,

    /// Also try slugs carrying a two-digit year before the index
    pub include_year: bool,

    /// Years used for year-qualified slugs; empty means the current year
    pub years: Vec<i32>,

    /// Highest page index tried per day
    pub max_index: u32,

    /// Scheme and host the slugs are appended to
    pub base_url: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 10,
            request_timeout_secs: 10,
            retry_count: 3,
            retry_delay_ms: 500,
            request_delay_ms: 100,
            months: Vec::new(),
            transliterate: true,
            include_year: false,
            years: Vec::new(),
            max_index: 30,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl SearchConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Months to enumerate, in calendar order
    pub fn effective_months(&self) -> Vec<u32> {
        if self.months.is_empty() {
            return (1..=12).collect();
        }

        let mut months = self.months.clone();
        months.sort_unstable();
        months.dedup();
        months
    }
}

/// Page validation rules
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FilterConfig {
    /// Case-sensitive substrings that reject a page
    pub denylist: Vec<String>,

    /// Page titles that mark a missing page
    pub not_found_titles: Vec<String>,

    /// Minimum number of characters of article text
    pub min_content_length: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            denylist: DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect(),
            not_found_titles: DEFAULT_NOT_FOUND_TITLES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_content_length: 50,
        }
    }
}

/// Classifier pass configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AnalysisConfig {
    /// Number of pages analyzed concurrently
    pub workers: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { workers: 8 }
    }
}

/// Telegram bot front end settings
///
/// Only the bot binary reads this section; the token may also come from the
/// `TELEGRAM_BOT_TOKEN` environment variable.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    /// Token issued by @BotFather
    pub token: String,

    /// Bot API origin, `{api-url}/bot{token}/{method}`
    pub api_url: String,

    /// Long-poll timeout for `getUpdates` (seconds)
    pub poll_timeout_secs: u64,

    /// Links per result message
    pub chunk_size: usize,

    /// Minimum time between two edits of the progress message (seconds)
    pub progress_interval_secs: u64,
}

impl BotConfig {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_secs(self.progress_interval_secs)
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: DEFAULT_BOT_API_URL.to_string(),
            poll_timeout_secs: 30,
            chunk_size: 50,
            progress_interval_secs: 2,
        }
    }
}

// Keeps the token out of logs
impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &if self.token.is_empty() { "" } else { "<redacted>" })
            .field("api_url", &self.api_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("chunk_size", &self.chunk_size)
            .field("progress_interval_secs", &self.progress_interval_secs)
            .finish()
    }
}
