//! Delivery domain - announcing postings on the notification channel

pub mod error;
pub mod format;
pub mod telegram_channel;

pub use error::DeliveryError;
pub use format::{escape_markdown_v2, format_job_message, APPLY_BUTTON_TEXT};
pub use telegram_channel::TelegramChannel;
