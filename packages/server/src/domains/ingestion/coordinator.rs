//! Runs the ingestion workflow over all active sources, one run at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{error, info};

use super::actions::{ingest_source, retry_unposted};
use super::{RetryOutcome, RunOutcome, RunStatus, RunSummary};
use crate::domains::delivery::DeliveryError;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Pause after each delivery attempt, to stay under channel rate limits.
    pub delivery_delay: Duration,
    /// How far back the retry job looks for unposted postings.
    pub retry_window: chrono::Duration,
    pub retry_batch_limit: i64,
    /// Age after which a delivery claim counts as abandoned. Must exceed the
    /// longest send.
    pub claim_lease: chrono::Duration,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            delivery_delay: Duration::from_secs(1),
            retry_window: chrono::Duration::hours(24),
            retry_batch_limit: 20,
            claim_lease: chrono::Duration::minutes(10),
        }
    }
}

impl RunSettings {
    /// Oldest creation time the retry scan considers.
    pub fn retry_since(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        now.checked_sub_signed(self.retry_window)
            .context("Retry window reaches past the representable time range")
    }

    /// Claims taken at or before this instant are expired.
    pub fn claims_stale_before(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        now.checked_sub_signed(self.claim_lease)
            .context("Claim lease reaches past the representable time range")
    }

    /// Check the time arithmetic once, so a bad value fails at startup rather
    /// than inside a scheduled task.
    pub fn validate(&self) -> Result<()> {
        let now = Utc::now();
        self.retry_since(now)?;
        self.claims_stale_before(now)?;
        anyhow::ensure!(self.retry_batch_limit >= 0, "Retry batch limit must not be negative");
        Ok(())
    }
}

/// Clears the running flag when dropped, including on panic.
struct RunGuard {
    flag: Arc<AtomicBool>,
}

impl RunGuard {
    fn try_acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct RunCoordinator {
    deps: ServerDeps,
    settings: RunSettings,
    running: Arc<AtomicBool>,
}

impl RunCoordinator {
    pub fn new(deps: ServerDeps, settings: RunSettings) -> Self {
        Self {
            deps,
            settings,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn deps(&self) -> &ServerDeps {
        &self.deps
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Run every active source now. Returns `Skipped` without doing anything
    /// if a run is already in progress. Only a failure to load the source
    /// list is an error; everything else lands in the summary.
    pub async fn run_all(&self) -> Result<RunOutcome> {
        let Some(guard) = RunGuard::try_acquire(&self.running) else {
            info!("Scraping already in progress, skipping");
            return Ok(RunOutcome::Skipped);
        };
        self.run_guarded(guard).await
    }

    /// Start a run in the background. The running flag is taken before this
    /// returns, so a second trigger right after sees `Skipped`.
    pub fn start_run(self: &Arc<Self>) -> RunStatus {
        let Some(guard) = RunGuard::try_acquire(&self.running) else {
            info!("Scraping already in progress, skipping");
            return RunStatus::Skipped;
        };

        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            match coordinator.run_guarded(guard).await {
                Ok(outcome) => info!(%outcome, "Background scrape finished"),
                Err(e) => error!(error = %format!("{:#}", e), "Background scrape failed"),
            }
        });

        RunStatus::Started
    }

    async fn run_guarded(&self, _guard: RunGuard) -> Result<RunOutcome> {
        info!("Starting scrape of all active sources");

        let sources = self
            .deps
            .source_registry
            .list_active()
            .await
            .context("Failed to load active sources")?;

        if sources.is_empty() {
            info!("No active sources to scrape");
            return Ok(RunOutcome::NoSources);
        }

        let mut summary = RunSummary::default();
        for source in &sources {
            if let Err(e) = ingest_source(&self.deps, &self.settings, source, &mut summary).await {
                error!(source = %source.name, error = %format!("{:#}", e), "Source failed");
                summary.record_source_error(&source.name, format!("{:#}", e));
            }
        }

        let outcome = RunOutcome::Completed(summary);
        info!(%outcome, sources = sources.len(), "Scrape complete");
        Ok(outcome)
    }

    /// Not serialized with runs: the delivery claim keeps a posting from
    /// being sent by both at once.
    pub async fn retry_unposted(&self) -> Result<RetryOutcome> {
        retry_unposted(&self.deps, &self.settings).await
    }

    pub async fn test_connection(&self) -> Result<String, DeliveryError> {
        self.deps.delivery.test_connection().await
    }
}
