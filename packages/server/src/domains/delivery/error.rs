use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Bot token or chat id missing
    #[error("Telegram is not configured")]
    NotConfigured,

    #[error(transparent)]
    Telegram(#[from] telegram::TelegramError),
}
