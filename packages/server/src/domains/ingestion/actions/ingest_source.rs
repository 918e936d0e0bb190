use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::deliver_posting::{deliver_posting, DeliveryOutcome};
use crate::domains::ingestion::{RunSettings, RunSummary};
use crate::domains::scraping::ExtractionCandidate;
use crate::domains::source::WebsiteSource;
use crate::kernel::ServerDeps;

/// Extract one source and ingest every candidate into `summary`.
///
/// Per-candidate failures are recorded as job errors. An `Err` means the
/// source as a whole failed (extractor error or bookkeeping failure).
pub async fn ingest_source(
    deps: &ServerDeps,
    settings: &RunSettings,
    source: &WebsiteSource,
    summary: &mut RunSummary,
) -> Result<()> {
    let candidates = deps
        .extractor
        .extract(source)
        .await
        .with_context(|| format!("Extraction failed for {}", source.name))?;

    summary.total_scraped += candidates.len();
    info!(source = %source.name, count = candidates.len(), "Processing candidates");

    for candidate in &candidates {
        if let Err(e) = ingest_candidate(deps, settings, candidate, summary).await {
            warn!(title = %candidate.title, error = %e, "Failed to ingest job");
            summary.record_job_error(&candidate.title, format!("{:#}", e));
        }
    }

    deps.source_registry
        .record_run(source.id, candidates.len() as i64)
        .await
        .with_context(|| format!("Failed to record run for {}", source.name))?;

    Ok(())
}

async fn ingest_candidate(
    deps: &ServerDeps,
    settings: &RunSettings,
    candidate: &ExtractionCandidate,
    summary: &mut RunSummary,
) -> Result<()> {
    if deps
        .job_store
        .find_by_fingerprint(&candidate.fingerprint)
        .await?
        .is_some()
    {
        debug!(title = %candidate.title, fingerprint = %candidate.fingerprint, "Job already stored, skipping");
        return Ok(());
    }

    let Some(posting) = deps.job_store.insert(candidate).await? else {
        debug!(fingerprint = %candidate.fingerprint, "Job stored concurrently, skipping");
        return Ok(());
    };

    summary.new_jobs += 1;
    info!(title = %posting.title, company = %posting.company, "New job saved");

    match deliver_posting(deps, settings, &posting).await {
        Ok(DeliveryOutcome::Delivered { .. }) => summary.delivered += 1,
        Ok(DeliveryOutcome::DeliveredUnrecorded { error, .. }) => {
            summary.delivered += 1;
            summary.record_job_error(&posting.title, error);
        }
        Ok(DeliveryOutcome::NotConfigured | DeliveryOutcome::AlreadyClaimed) => return Ok(()),
        Err(e) => summary.record_job_error(&posting.title, format!("{:#}", e)),
    }

    if !settings.delivery_delay.is_zero() {
        tokio::time::sleep(settings.delivery_delay).await;
    }

    Ok(())
}
