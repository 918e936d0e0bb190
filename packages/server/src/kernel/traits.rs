// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (dedup, delivery protocol, retry) lives in domains/ingestion
// and talks to the outside world through these seams.
//
// Naming convention: Base* for trait names (e.g., BaseJobStore)

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::common::{JobPostingId, WebsiteSourceId};
use crate::domains::delivery::DeliveryError;
use crate::domains::jobs::JobPosting;
use crate::domains::scraping::ExtractionCandidate;
use crate::domains::source::WebsiteSource;

// =============================================================================
// Job Store
// =============================================================================

#[async_trait]
pub trait BaseJobStore: Send + Sync {
    async fn find_by_fingerprint(&self, fingerprint: &str) -> Result<Option<JobPosting>>;

    /// Insert a candidate as a new posting. `None` when a posting with the
    /// same fingerprint already exists; never creates a second row.
    async fn insert(&self, candidate: &ExtractionCandidate) -> Result<Option<JobPosting>>;

    /// Take the delivery claim. False when posted, held, or claimed after
    /// `claims_stale_before`; older claims are taken over.
    async fn claim_for_delivery(
        &self,
        id: JobPostingId,
        claims_stale_before: DateTime<Utc>,
    ) -> Result<bool>;

    /// Give the claim back after a failed transmission.
    async fn release_claim(&self, id: JobPostingId) -> Result<()>;

    /// Mark a sent posting whose message id could not be recorded, so it is
    /// never claimed again.
    async fn hold_delivery(&self, id: JobPostingId) -> Result<()>;

    /// Record the channel's message id and clear the claim.
    async fn mark_posted(&self, id: JobPostingId, message_id: i64) -> Result<()>;

    /// Claimable postings created at or after `since`, oldest first.
    async fn find_unposted_since(
        &self,
        since: DateTime<Utc>,
        claims_stale_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<JobPosting>>;
}

// =============================================================================
// Source Registry
// =============================================================================

#[async_trait]
pub trait BaseSourceRegistry: Send + Sync {
    async fn list_active(&self) -> Result<Vec<WebsiteSource>>;

    /// Stamp the scrape time and add `candidates_found` to the running total.
    async fn record_run(&self, id: WebsiteSourceId, candidates_found: i64) -> Result<()>;
}

// =============================================================================
// Job Extractor
// =============================================================================

#[async_trait]
pub trait BaseJobExtractor: Send + Sync {
    /// Candidates found on the source. Production extractors report site
    /// failures as an empty list rather than an error.
    async fn extract(&self, source: &WebsiteSource) -> Result<Vec<ExtractionCandidate>>;
}

// =============================================================================
// Delivery Channel
// =============================================================================

#[async_trait]
pub trait BaseDeliveryChannel: Send + Sync {
    fn is_configured(&self) -> bool;

    /// Announce a posting. `Ok(None)` when the channel is not configured.
    async fn post_job(&self, posting: &JobPosting) -> Result<Option<i64>, DeliveryError>;

    /// Verify credentials; returns the bot's display name.
    async fn test_connection(&self) -> Result<String, DeliveryError>;
}
