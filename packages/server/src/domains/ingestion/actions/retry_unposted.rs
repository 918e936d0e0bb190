use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use super::deliver_posting::deliver_posting;
use crate::domains::ingestion::{RetryOutcome, RunSettings};
use crate::kernel::ServerDeps;

/// Re-attempt delivery of recent postings that never reached the channel.
pub async fn retry_unposted(deps: &ServerDeps, settings: &RunSettings) -> Result<RetryOutcome> {
    let now = Utc::now();
    let since = settings.retry_since(now)?;
    let claims_stale_before = settings.claims_stale_before(now)?;
    let postings = deps
        .job_store
        .find_unposted_since(since, claims_stale_before, settings.retry_batch_limit.max(0))
        .await
        .context("Failed to load unposted jobs")?;

    let mut outcome = RetryOutcome {
        attempted: postings.len(),
        succeeded: 0,
    };

    if postings.is_empty() {
        info!("No unposted jobs to retry");
        return Ok(outcome);
    }

    info!(count = postings.len(), "Retrying unposted jobs");

    for posting in &postings {
        match deliver_posting(deps, settings, posting).await {
            Ok(delivery) if delivery.was_sent() => outcome.succeeded += 1,
            Ok(_) => continue,
            Err(e) => warn!(title = %posting.title, error = %e, "Retry failed"),
        }

        if !settings.delivery_delay.is_zero() {
            tokio::time::sleep(settings.delivery_delay).await;
        }
    }

    info!(
        attempted = outcome.attempted,
        succeeded = outcome.succeeded,
        "Retry finished"
    );
    Ok(outcome)
}
