use std::time::Duration;

use async_trait::async_trait;
use telegram::{
    InlineKeyboardMarkup, ParseMode, SendMessageRequest, TelegramOptions, TelegramService,
};
use tracing::{error, info, warn};

use super::format::{format_job_message, APPLY_BUTTON_TEXT};
use super::DeliveryError;
use crate::domains::jobs::JobPosting;
use crate::kernel::BaseDeliveryChannel;

struct TelegramTarget {
    service: TelegramService,
    chat_id: String,
}

/// Posts job announcements to one Telegram chat. Without a bot token and
/// chat id every post is a no-op.
pub struct TelegramChannel {
    target: Option<TelegramTarget>,
}

impl TelegramChannel {
    pub fn new(service: TelegramService, chat_id: impl Into<String>) -> Self {
        Self {
            target: Some(TelegramTarget {
                service,
                chat_id: chat_id.into(),
            }),
        }
    }

    pub fn unconfigured() -> Self {
        Self { target: None }
    }

    pub fn from_config(
        bot_token: Option<&str>,
        chat_id: Option<&str>,
        api_url: &str,
        timeout: Duration,
    ) -> Result<Self, DeliveryError> {
        match (bot_token, chat_id) {
            (Some(token), Some(chat_id)) => {
                let options = TelegramOptions::new(token)
                    .with_api_url(api_url)
                    .with_timeout(timeout);
                let service = TelegramService::new(options)?;
                info!("Telegram delivery enabled");
                Ok(Self::new(service, chat_id))
            }
            _ => {
                warn!("TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID not set, job announcements disabled");
                Ok(Self::unconfigured())
            }
        }
    }

    pub fn build_request(posting: &JobPosting, chat_id: &str) -> SendMessageRequest {
        SendMessageRequest::new(chat_id, format_job_message(posting))
            .parse_mode(ParseMode::MarkdownV2)
            .reply_markup(InlineKeyboardMarkup::single_link(
                APPLY_BUTTON_TEXT,
                &posting.apply_url,
            ))
            .disable_web_page_preview()
    }
}

#[async_trait]
impl BaseDeliveryChannel for TelegramChannel {
    fn is_configured(&self) -> bool {
        self.target.is_some()
    }

    async fn post_job(&self, posting: &JobPosting) -> Result<Option<i64>, DeliveryError> {
        let Some(target) = &self.target else {
            return Ok(None);
        };

        let request = Self::build_request(posting, &target.chat_id);
        match target.service.send_message(&request).await {
            Ok(message) => {
                info!(title = %posting.title, message_id = message.message_id, "Posted job to Telegram");
                Ok(Some(message.message_id))
            }
            Err(e) => {
                error!(title = %posting.title, error = %e, "Failed to post job to Telegram");
                Err(e.into())
            }
        }
    }

    async fn test_connection(&self) -> Result<String, DeliveryError> {
        let target = self.target.as_ref().ok_or(DeliveryError::NotConfigured)?;
        let me = target.service.get_me().await?;
        let name = me.username.unwrap_or(me.first_name);
        info!(bot = %name, "Telegram bot connected");
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::scraping::ExtractionCandidate;
    use chrono::Utc;

    #[test]
    fn test_request_carries_apply_button() {
        let candidate = ExtractionCandidate::new(
            "Solidity Dev",
            "Acme",
            "https://acme.xyz/jobs/1",
            "Acme",
            "https://acme.xyz",
        );
        let posting = JobPosting::from_candidate(&candidate, Utc::now());

        let request = TelegramChannel::build_request(&posting, "@web3jobs");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["chat_id"], "@web3jobs");
        assert_eq!(json["parse_mode"], "MarkdownV2");
        assert_eq!(json["disable_web_page_preview"], true);
        assert_eq!(
            json["reply_markup"]["inline_keyboard"][0][0]["url"],
            "https://acme.xyz/jobs/1"
        );
        assert_eq!(
            json["reply_markup"]["inline_keyboard"][0][0]["text"],
            APPLY_BUTTON_TEXT
        );
    }

    #[tokio::test]
    async fn test_unconfigured_channel_is_a_no_op() {
        let channel = TelegramChannel::from_config(None, Some("@chat"), "https://api.telegram.org", Duration::from_secs(5)).unwrap();
        assert!(!channel.is_configured());

        let candidate = ExtractionCandidate::new("A", "B", "https://b.io/1", "B", "https://b.io");
        let posting = JobPosting::from_candidate(&candidate, Utc::now());

        assert!(channel.post_job(&posting).await.unwrap().is_none());
        assert!(matches!(
            channel.test_connection().await,
            Err(DeliveryError::NotConfigured)
        ));
    }
}
