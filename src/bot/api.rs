//! Minimal Telegram Bot API client
//!
//! Only the three methods the bot needs: `getUpdates` (long polling),
//! `sendMessage` and `editMessageText`. Messages are sent as plain text.

use crate::bot::{BotError, BotResult};
use crate::config::BotConfig;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Headroom on top of the long-poll timeout before the HTTP request gives up
const POLL_GRACE: Duration = Duration::from_secs(10);

/// Incoming update; only message updates are kept
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Envelope every Bot API method answers with
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Serialize)]
struct GetUpdates {
    offset: i64,
    timeout: u64,
    allowed_updates: &'static [&'static str],
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Serialize)]
struct EditMessageText<'a> {
    chat_id: i64,
    message_id: i64,
    text: &'a str,
    disable_web_page_preview: bool,
}

/// Bot API client bound to one bot token
pub struct BotApi {
    client: Client,
    endpoint: String,
}

impl BotApi {
    pub fn new(client: Client, api_url: &str, token: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        }
    }

    /// Builds a client whose timeout outlasts the long poll
    pub fn from_config(config: &BotConfig) -> BotResult<Self> {
        let user_agent = format!("telegraph-finder-bot/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(config.poll_timeout() + POLL_GRACE)
            .build()?;

        Ok(Self::new(client, &config.api_url, &config.token))
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> BotResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}/{}", self.endpoint, method))
            .json(body)
            .send()
            .await?;

        // Error statuses still carry the JSON envelope with a description
        let envelope: ApiResponse<T> = response.json().await?;

        match envelope {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(BotError::Api {
                method: method.to_string(),
                description: description.unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }

    /// Long-polls for updates with ids at or above `offset`
    pub async fn get_updates(&self, offset: i64, timeout: Duration) -> BotResult<Vec<Update>> {
        let body = GetUpdates {
            offset,
            timeout: timeout.as_secs(),
            allowed_updates: &["message"],
        };
        self.call("getUpdates", &body).await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> BotResult<Message> {
        let body = SendMessage {
            chat_id,
            text,
            disable_web_page_preview: true,
        };
        self.call("sendMessage", &body).await
    }

    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> BotResult<()> {
        let body = EditMessageText {
            chat_id,
            message_id,
            text,
            disable_web_page_preview: true,
        };
        // Answers with the edited message, or `true` for inline messages
        let _: serde_json::Value = self.call("editMessageText", &body).await?;
        Ok(())
    }
}
