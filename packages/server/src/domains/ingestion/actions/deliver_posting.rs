//! Claim, transmit, record.
//!
//! A posting is claimed before transmission so a concurrent retry cannot
//! send it twice. A failed transmission releases the claim; a claim that is
//! never released (crash, failed release) expires after the lease. If the
//! channel accepted the message but recording it failed, the posting is
//! held: it is never claimed again, trading a possible missed record for a
//! single announcement.

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, error, warn};

use crate::domains::ingestion::RunSettings;
use crate::domains::jobs::JobPosting;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered { message_id: i64 },
    /// Sent, but the posted status could not be stored.
    DeliveredUnrecorded { message_id: i64, error: String },
    NotConfigured,
    /// Already posted or claimed by another worker.
    AlreadyClaimed,
}

impl DeliveryOutcome {
    pub fn was_sent(&self) -> bool {
        matches!(
            self,
            DeliveryOutcome::Delivered { .. } | DeliveryOutcome::DeliveredUnrecorded { .. }
        )
    }
}

/// Errors are transmission or claim failures; the posting stays unposted
/// and eligible for retry.
pub async fn deliver_posting(
    deps: &ServerDeps,
    settings: &RunSettings,
    posting: &JobPosting,
) -> Result<DeliveryOutcome> {
    if !deps.delivery.is_configured() {
        return Ok(DeliveryOutcome::NotConfigured);
    }

    let claims_stale_before = settings.claims_stale_before(Utc::now())?;
    let claimed = deps
        .job_store
        .claim_for_delivery(posting.id, claims_stale_before)
        .await
        .context("Failed to claim posting for delivery")?;
    if !claimed {
        debug!(title = %posting.title, "Posting already claimed or posted, skipping");
        return Ok(DeliveryOutcome::AlreadyClaimed);
    }

    let sent = deps.delivery.post_job(posting).await;

    let message_id = match sent {
        Ok(Some(message_id)) => message_id,
        Ok(None) => {
            release(deps, posting).await;
            return Ok(DeliveryOutcome::NotConfigured);
        }
        Err(e) => {
            release(deps, posting).await;
            return Err(e).context("Failed to post to Telegram");
        }
    };

    match deps.job_store.mark_posted(posting.id, message_id).await {
        Ok(()) => Ok(DeliveryOutcome::Delivered { message_id }),
        Err(e) => {
            error!(
                title = %posting.title,
                message_id,
                error = %e,
                "Posted but failed to record status; holding it so it is not resent"
            );
            if let Err(hold_error) = deps.job_store.hold_delivery(posting.id).await {
                error!(
                    title = %posting.title,
                    error = %hold_error,
                    "Failed to hold posting; it may be resent after the claim lease"
                );
            }
            Ok(DeliveryOutcome::DeliveredUnrecorded {
                message_id,
                error: format!("{:#}", e),
            })
        }
    }
}

async fn release(deps: &ServerDeps, posting: &JobPosting) {
    if let Err(e) = deps.job_store.release_claim(posting.id).await {
        warn!(
            title = %posting.title,
            error = %e,
            "Failed to release delivery claim; it frees up when the lease expires"
        );
    }
}
