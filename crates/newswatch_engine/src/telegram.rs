//! Telegram Bot API sink.

use std::time::Duration;

use newswatch_logging::watch_debug;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use crate::notify::{MessageFormat, MessageSink, OutgoingMessage};
use crate::{SinkError, SinkErrorKind};

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Clone)]
pub struct TelegramSettings {
    pub api_base: String,
    pub bot_token: String,
    pub chat_id: String,
    pub disable_link_preview: bool,
    pub request_timeout: Duration,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            bot_token: String::new(),
            chat_id: String::new(),
            disable_link_preview: false,
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    disable_web_page_preview: bool,
}

#[derive(Debug, Serialize)]
struct GetChatRequest<'a> {
    chat_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    #[serde(default)]
    retry_after: Option<u64>,
}

pub struct TelegramSink {
    client: reqwest::Client,
    settings: TelegramSettings,
}

impl TelegramSink {
    pub fn new(settings: TelegramSettings) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| SinkError::new(SinkErrorKind::Network, err.to_string()))?;
        Ok(Self { client, settings })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.settings.api_base.trim_end_matches('/'),
            self.settings.bot_token,
            method
        )
    }

    async fn call<T: Serialize + ?Sized>(&self, method: &str, body: &T) -> Result<(), SinkError> {
        if self.settings.bot_token.is_empty() || self.settings.chat_id.is_empty() {
            return Err(SinkError::new(
                SinkErrorKind::NotConfigured,
                "bot token and chat id are required",
            ));
        }
        let payload = serde_json::to_vec(body)
            .map_err(|err| SinkError::new(SinkErrorKind::InvalidResponse, err.to_string()))?;

        let response = self
            .client
            .post(self.method_url(method))
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        watch_debug!("Telegram {} responded with {}", method, status);

        let parsed: Option<ApiResponse> = serde_json::from_slice(&body).ok();
        match parsed {
            Some(reply) if reply.ok && (200..300).contains(&status) => Ok(()),
            Some(reply) => Err(classify_failure(
                status,
                reply.description.unwrap_or_default(),
                reply.parameters.and_then(|p| p.retry_after),
            )),
            None if (200..300).contains(&status) => Err(SinkError::new(
                SinkErrorKind::InvalidResponse,
                "response body is not a Bot API reply",
            )),
            None => Err(classify_failure(
                status,
                String::from_utf8_lossy(&body).into_owned(),
                None,
            )),
        }
    }
}

#[async_trait::async_trait]
impl MessageSink for TelegramSink {
    async fn check_reachable(&self) -> Result<(), SinkError> {
        self.call(
            "getChat",
            &GetChatRequest {
                chat_id: &self.settings.chat_id,
            },
        )
        .await
    }

    async fn send(&self, message: &OutgoingMessage) -> Result<(), SinkError> {
        let parse_mode = match message.format {
            MessageFormat::Markdown => Some("Markdown"),
            MessageFormat::Plain => None,
        };
        self.call(
            "sendMessage",
            &SendMessageRequest {
                chat_id: &self.settings.chat_id,
                text: &message.text,
                parse_mode,
                disable_web_page_preview: self.settings.disable_link_preview,
            },
        )
        .await
    }
}

fn classify_failure(status: u16, description: String, retry_after: Option<u64>) -> SinkError {
    let kind = match status {
        400 if is_markup_complaint(&description) => SinkErrorKind::Formatting,
        401 | 403 => SinkErrorKind::Unauthorized,
        429 => SinkErrorKind::RateLimited {
            retry_after_secs: retry_after,
        },
        200..=299 => SinkErrorKind::InvalidResponse,
        other => SinkErrorKind::Rejected(other),
    };
    SinkError::new(kind, description)
}

fn is_markup_complaint(description: &str) -> bool {
    let description = description.to_ascii_lowercase();
    description.contains("parse entities") || description.contains("can't find end of")
}

// The request URL embeds the bot token, so it is stripped before logging.
fn map_reqwest_error(err: reqwest::Error) -> SinkError {
    let kind = if err.is_timeout() {
        SinkErrorKind::Timeout
    } else {
        SinkErrorKind::Network
    };
    SinkError::new(kind, err.without_url().to_string())
}
