//! Single dispatch point from a source to its extractor.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};

use super::extractors::http::USER_AGENT;
use super::extractors::{GenericExtractor, JumpTradingExtractor, RemoteOkExtractor};
use super::{ExtractionCandidate, ExtractionResult};
use crate::domains::source::{NamedExtractor, SourceKind, WebsiteSource};
use crate::kernel::BaseJobExtractor;

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub http_timeout: Duration,
    pub browser_timeout: Duration,
    pub node_binary: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            http_timeout: Duration::from_secs(15),
            browser_timeout: Duration::from_secs(45),
            node_binary: "node".to_string(),
        }
    }
}

pub struct SourceExtractor {
    generic: GenericExtractor,
    remoteok: RemoteOkExtractor,
    jump_trading: JumpTradingExtractor,
}

impl SourceExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            generic: GenericExtractor::new(client.clone()),
            remoteok: RemoteOkExtractor::new(client),
            jump_trading: JumpTradingExtractor::new(config.node_binary, config.browser_timeout),
        })
    }

    pub async fn try_extract(&self, source: &WebsiteSource) -> ExtractionResult<Vec<ExtractionCandidate>> {
        match source.kind() {
            SourceKind::Generic(selectors) => self.generic.extract(source, &selectors).await,
            SourceKind::Named(NamedExtractor::RemoteOk) => self.remoteok.extract(source).await,
            SourceKind::Named(NamedExtractor::JumpTrading) => self.jump_trading.extract(source).await,
        }
    }
}

#[async_trait]
impl BaseJobExtractor for SourceExtractor {
    /// Extraction failures are logged and reported as zero candidates.
    async fn extract(&self, source: &WebsiteSource) -> Result<Vec<ExtractionCandidate>> {
        let kind = source.kind();
        info!(source = %source.name, url = %source.url, kind = ?kind, "Scraping source");

        match self.try_extract(source).await {
            Ok(candidates) => {
                if candidates.is_empty() {
                    warn!(source = %source.name, "No jobs found, selectors may need updating");
                } else {
                    info!(source = %source.name, count = candidates.len(), "Jobs extracted");
                }
                Ok(candidates)
            }
            Err(e) => {
                warn!(source = %source.name, error = %e, "Extraction failed");
                Ok(Vec::new())
            }
        }
    }
}
