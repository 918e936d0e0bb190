//! Typed errors for extractors.
//!
//! Extractors return these; the dispatch layer logs them and degrades to an
//! empty candidate list, so one broken site never ends a run.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Request could not be sent or the body could not be read
    #[error("HTTP error fetching {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("timeout fetching {url}")]
    Timeout { url: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("unexpected response format: {0}")]
    Format(String),

    #[error("headless browser failed: {0}")]
    Browser(String),

    #[error("headless browser timed out after {0:?}")]
    BrowserTimeout(Duration),
}

impl ExtractionError {
    pub(crate) fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ExtractionError::Timeout {
                url: url.to_string(),
            }
        } else {
            ExtractionError::Http {
                url: url.to_string(),
                source: error,
            }
        }
    }
}

pub type ExtractionResult<T> = std::result::Result<T, ExtractionError>;
