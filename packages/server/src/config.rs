use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::domains::ingestion::RunSettings;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub telegram_api_url: String,
    pub scrape_interval_minutes: u32,
    /// `None` disables the scheduled retry job.
    pub retry_cron: Option<String>,
    pub delivery_delay_ms: u64,
    pub retry_window_hours: u32,
    pub retry_batch_limit: u32,
    pub claim_lease_secs: u32,
    pub http_timeout_secs: u64,
    pub browser_timeout_secs: u64,
    pub node_binary: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: parse_or("PORT", 5000)?,
            telegram_bot_token: non_empty_var("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: non_empty_var("TELEGRAM_CHAT_ID"),
            telegram_api_url: env::var("TELEGRAM_API_URL")
                .unwrap_or_else(|_| telegram::DEFAULT_API_URL.to_string()),
            scrape_interval_minutes: parse_or("SCRAPE_INTERVAL_MINUTES", 30)?,
            retry_cron: match env::var("RETRY_CRON") {
                Ok(v) if v.trim().eq_ignore_ascii_case("off") => None,
                Ok(v) if !v.trim().is_empty() => Some(v),
                _ => Some("0 15 * * * *".to_string()),
            },
            delivery_delay_ms: parse_or("DELIVERY_DELAY_MS", 1000)?,
            retry_window_hours: parse_or("RETRY_WINDOW_HOURS", 24)?,
            retry_batch_limit: parse_or("RETRY_BATCH_LIMIT", 20)?,
            claim_lease_secs: parse_or("CLAIM_LEASE_SECS", 600)?,
            http_timeout_secs: parse_or("HTTP_TIMEOUT_SECS", 15)?,
            browser_timeout_secs: parse_or("BROWSER_TIMEOUT_SECS", 45)?,
            node_binary: env::var("NODE_BINARY").unwrap_or_else(|_| "node".to_string()),
        })
    }

    /// Six-field cron expression (seconds first) for the periodic run.
    pub fn scrape_cron(&self) -> String {
        scrape_cron_expression(self.scrape_interval_minutes)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn browser_timeout(&self) -> Duration {
        Duration::from_secs(self.browser_timeout_secs)
    }

    /// Errors when the retry window or claim lease cannot be represented.
    pub fn run_settings(&self) -> Result<RunSettings> {
        let settings = RunSettings {
            delivery_delay: Duration::from_millis(self.delivery_delay_ms),
            retry_window: chrono::Duration::try_hours(i64::from(self.retry_window_hours))
                .context("RETRY_WINDOW_HOURS is too large")?,
            retry_batch_limit: i64::from(self.retry_batch_limit),
            claim_lease: chrono::Duration::try_seconds(i64::from(self.claim_lease_secs))
                .context("CLAIM_LEASE_SECS is too large")?,
        };
        settings
            .validate()
            .context("RETRY_WINDOW_HOURS or CLAIM_LEASE_SECS is out of range")?;
        Ok(settings)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", key)),
        Err(_) => Ok(default),
    }
}

/// Minutes in 1..=59 run every N minutes; anything else falls back to hourly.
pub fn scrape_cron_expression(interval_minutes: u32) -> String {
    match interval_minutes {
        1..=59 => format!("0 */{} * * * *", interval_minutes),
        _ => "0 0 * * * *".to_string(),
    }
}
