//! Minimal Telegram Bot API client: long-poll `getUpdates` and `sendMessage`.

use async_trait::async_trait;
use seatwatch_backend::engine::MessageChannel;
use seatwatch_common::SubscriberId;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

/// Extra HTTP headroom on top of the long-poll timeout
const POLL_HEADROOM: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Telegram API error {code:?}: {description}")]
    Api { code: Option<i64>, description: String },
}

impl TelegramError {
    /// The Markdown in the text was rejected
    pub fn is_markup_rejected(&self) -> bool {
        matches!(self, TelegramError::Api { description, .. } if description.contains("can't parse entities"))
    }
}

#[derive(Deserialize, Debug)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
}

impl<T> ApiResponse<T> {
    fn into_result(self) -> Result<T, TelegramError> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(TelegramError::Api {
                code: self.error_code,
                description: self.description.unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Chat {
    pub id: i64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
}

impl Message {
    /// Sender's first name, or empty when the message has no sender
    pub fn first_name(&self) -> &str {
        self.from.as_ref().map(|u| u.first_name.as_str()).unwrap_or_default()
    }
}

#[derive(Serialize, Debug)]
struct GetUpdatesRequest<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Serialize, Debug)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
    disable_web_page_preview: bool,
}

#[derive(Serialize, Debug)]
struct DeleteWebhookRequest {
    drop_pending_updates: bool,
}

pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
    poll_timeout: Duration,
}

impl TelegramClient {
    pub fn new(api_url: &str, token: &str, poll_timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(poll_timeout + POLL_HEADROOM)
            .build()?;
        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
            poll_timeout,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, TelegramError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        // Errors come back as JSON with a non-2xx status, so don't check the status first
        let response: ApiResponse<T> = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?
            .json()
            .await?;
        response.into_result()
    }

    /// Discard updates that queued up while the bot was offline
    pub async fn drop_pending_updates(&self) -> Result<(), TelegramError> {
        let _: bool = self
            .call("deleteWebhook", &DeleteWebhookRequest { drop_pending_updates: true })
            .await?;
        Ok(())
    }

    /// Long-poll for updates after `offset`
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TelegramError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: self.poll_timeout.as_secs(),
            allowed_updates: &["message"],
        };
        self.call("getUpdates", &request).await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str, parse_mode: Option<&str>) -> Result<(), TelegramError> {
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode,
            disable_web_page_preview: true,
        };
        let _: Message = self.call("sendMessage", &request).await?;
        Ok(())
    }

    /// Send as Markdown, retrying as plain text if Telegram rejects the markup
    pub async fn send_markdown(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        match self.send_message(chat_id, text, Some("Markdown")).await {
            Err(e) if e.is_markup_rejected() => {
                tracing::warn!("Markdown rejected for chat {}, resending as plain text: {}", chat_id, e);
                self.send_message(chat_id, &strip_markdown(text), None).await
            }
            other => other,
        }
    }
}

#[async_trait]
impl MessageChannel for TelegramClient {
    async fn send_text(&self, subscriber: SubscriberId, text: &str) -> anyhow::Result<()> {
        self.send_markdown(subscriber.0, text).await?;
        Ok(())
    }
}

/// Drop bold and code markers for the plain-text fallback; underscores stay since
/// they appear in section codes
fn strip_markdown(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '*' | '`')).collect()
}
