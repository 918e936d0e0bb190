//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! ```text
//! Scheduler (every N minutes)
//!     └─► RunCoordinator::run_all()      (skips if a run is in progress)
//!
//! Scheduler (hourly, optional)
//!     └─► RunCoordinator::retry_unposted()
//! ```

use anyhow::Result;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::ingestion::{RunCoordinator, RunOutcome};

/// Start all scheduled tasks. `retry_cron` of `None` disables the retry job.
pub async fn start_scheduler(
    coordinator: Arc<RunCoordinator>,
    scrape_cron: &str,
    retry_cron: Option<&str>,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let scrape_coordinator = coordinator.clone();
    let scrape_job = Job::new_async(scrape_cron, move |_uuid, _lock| {
        let coordinator = scrape_coordinator.clone();
        Box::pin(async move {
            run_scheduled_scrape(&coordinator).await;
        })
    })?;

    scheduler.add(scrape_job).await?;

    if let Some(retry_cron) = retry_cron {
        let retry_coordinator = coordinator.clone();
        let retry_job = Job::new_async(retry_cron, move |_uuid, _lock| {
            let coordinator = retry_coordinator.clone();
            Box::pin(async move {
                match coordinator.retry_unposted().await {
                    Ok(outcome) => tracing::info!(
                        attempted = outcome.attempted,
                        succeeded = outcome.succeeded,
                        "Scheduled retry finished"
                    ),
                    Err(e) => tracing::error!("Scheduled retry failed: {:#}", e),
                }
            })
        })?;

        scheduler.add(retry_job).await?;
    }

    scheduler.start().await?;

    tracing::info!(
        scrape_cron = %scrape_cron,
        retry_cron = retry_cron.unwrap_or("disabled"),
        "Scheduled tasks started"
    );
    Ok(scheduler)
}

async fn run_scheduled_scrape(coordinator: &RunCoordinator) {
    tracing::info!("Running scheduled scrape");

    match coordinator.run_all().await {
        Ok(RunOutcome::Skipped) => {
            tracing::info!("Previous scrape still running, skipping this tick")
        }
        Ok(outcome) => tracing::info!(%outcome, "Scheduled scrape finished"),
        Err(e) => tracing::error!("Scheduled scrape failed: {:#}", e),
    }
}
