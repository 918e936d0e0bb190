// Thin client for the two Telegram Bot API methods a broadcast bot needs:
// `sendMessage` and `getMe`.

use std::time::Duration;

pub mod models;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub use crate::models::{
    ApiResponse, InlineKeyboardButton, InlineKeyboardMarkup, Message, ParseMode,
    SendMessageRequest, User,
};

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Telegram request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Telegram request timed out")]
    Timeout,

    #[error("Telegram API error ({code}): {description}")]
    Api { code: u16, description: String },

    #[error("Telegram rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Unexpected Telegram response (HTTP {status}): {message}")]
    Parse { status: u16, message: String },
}

impl From<reqwest::Error> for TelegramError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TelegramError::Timeout
        } else {
            // The request URL embeds the bot token.
            TelegramError::Http(e.without_url())
        }
    }
}

pub type Result<T> = std::result::Result<T, TelegramError>;

#[derive(Debug, Clone)]
pub struct TelegramOptions {
    pub bot_token: String,
    pub api_url: String,
    pub timeout: Duration,
}

impl TelegramOptions {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone)]
pub struct TelegramService {
    options: TelegramOptions,
    client: Client,
}

impl TelegramService {
    pub fn new(options: TelegramOptions) -> Result<Self> {
        let client = Client::builder().timeout(options.timeout).build()?;
        Ok(Self { options, client })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.options.api_url.trim_end_matches('/'),
            self.options.bot_token,
            method
        )
    }

    /// Sends a message and returns the message Telegram stored.
    pub async fn send_message(&self, request: &SendMessageRequest) -> Result<Message> {
        tracing::debug!(chat_id = %request.chat_id, "Sending Telegram message");
        self.call("sendMessage", request).await
    }

    /// Returns the bot account behind the configured token.
    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &serde_json::json!({})).await
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;

        let envelope: ApiResponse<T> =
            serde_json::from_str(&text).map_err(|e| TelegramError::Parse {
                status,
                message: e.to_string(),
            })?;

        interpret_response(status, envelope)
    }
}

/// Maps a decoded Bot API envelope onto the client's result type.
pub fn interpret_response<T>(status: u16, envelope: ApiResponse<T>) -> Result<T> {
    if envelope.ok {
        return envelope.result.ok_or(TelegramError::Parse {
            status,
            message: "ok response without result".to_string(),
        });
    }

    let code = envelope.error_code.unwrap_or(status);
    if code == 429 {
        let retry_after_secs = envelope
            .parameters
            .and_then(|p| p.retry_after)
            .unwrap_or(30);
        return Err(TelegramError::RateLimited { retry_after_secs });
    }

    Err(TelegramError::Api {
        code,
        description: envelope
            .description
            .unwrap_or_else(|| "Unknown Telegram API error".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope<T: DeserializeOwned>(json: &str) -> ApiResponse<T> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_method_url_strips_trailing_slash() {
        let service = TelegramService::new(
            TelegramOptions::new("123:ABC").with_api_url("http://localhost:8081/"),
        )
        .unwrap();
        assert_eq!(
            service.method_url("getMe"),
            "http://localhost:8081/bot123:ABC/getMe"
        );
    }

    #[test]
    fn test_send_message_request_skips_unset_fields() {
        let request = SendMessageRequest::new("-100123", "hello");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"chat_id": "-100123", "text": "hello"}));
    }

    #[test]
    fn test_send_message_request_with_keyboard() {
        let request = SendMessageRequest::new("42", "*hi*")
            .parse_mode(ParseMode::MarkdownV2)
            .reply_markup(InlineKeyboardMarkup::single_link("Apply", "https://a.co/1"))
            .disable_web_page_preview();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["parse_mode"], "MarkdownV2");
        assert_eq!(json["disable_web_page_preview"], true);
        assert_eq!(json["reply_markup"]["inline_keyboard"][0][0]["url"], "https://a.co/1");
    }

    #[test]
    fn test_interpret_ok_message() {
        let body = envelope::<Message>(
            r#"{"ok":true,"result":{"message_id":77,"date":1700000000,"chat":{"id":-100}}}"#,
        );
        let message = interpret_response(200, body).unwrap();
        assert_eq!(message.message_id, 77);
        assert_eq!(message.chat.id, -100);
    }

    #[test]
    fn test_interpret_rate_limited() {
        let body = envelope::<Message>(
            r#"{"ok":false,"error_code":429,"description":"Too Many Requests","parameters":{"retry_after":12}}"#,
        );
        match interpret_response(429, body) {
            Err(TelegramError::RateLimited { retry_after_secs }) => assert_eq!(retry_after_secs, 12),
            other => panic!("expected rate limit, got {:?}", other),
        }
    }

    #[test]
    fn test_interpret_api_error() {
        let body = envelope::<Message>(
            r#"{"ok":false,"error_code":400,"description":"Bad Request: can't parse entities"}"#,
        );
        let err = interpret_response(400, body).unwrap_err();
        assert!(err.to_string().contains("can't parse entities"));
    }

    #[test]
    fn test_interpret_ok_without_result() {
        let body = envelope::<User>(r#"{"ok":true}"#);
        assert!(matches!(
            interpret_response(200, body),
            Err(TelegramError::Parse { status: 200, .. })
        ));
    }
}
