//! Postgres-backed implementations of the store traits.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::{JobPostingId, WebsiteSourceId};
use crate::domains::jobs::JobPosting;
use crate::domains::scraping::ExtractionCandidate;
use crate::domains::source::WebsiteSource;
use crate::kernel::{BaseJobStore, BaseSourceRegistry};

pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseJobStore for PgJobStore {
    async fn find_by_fingerprint(&self, fingerprint: &str) -> Result<Option<JobPosting>> {
        JobPosting::find_by_fingerprint(fingerprint, &self.pool).await
    }

    async fn insert(&self, candidate: &ExtractionCandidate) -> Result<Option<JobPosting>> {
        JobPosting::insert(candidate, &self.pool).await
    }

    async fn claim_for_delivery(
        &self,
        id: JobPostingId,
        claims_stale_before: DateTime<Utc>,
    ) -> Result<bool> {
        JobPosting::claim_for_delivery(id, claims_stale_before, &self.pool).await
    }

    async fn release_claim(&self, id: JobPostingId) -> Result<()> {
        JobPosting::release_claim(id, &self.pool).await
    }

    async fn hold_delivery(&self, id: JobPostingId) -> Result<()> {
        JobPosting::hold_delivery(id, &self.pool).await
    }

    async fn mark_posted(&self, id: JobPostingId, message_id: i64) -> Result<()> {
        JobPosting::mark_posted(id, message_id, &self.pool).await
    }

    async fn find_unposted_since(
        &self,
        since: DateTime<Utc>,
        claims_stale_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<JobPosting>> {
        JobPosting::find_unposted_since(since, claims_stale_before, limit, &self.pool).await
    }
}

pub struct PgSourceRegistry {
    pool: PgPool,
}

impl PgSourceRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseSourceRegistry for PgSourceRegistry {
    async fn list_active(&self) -> Result<Vec<WebsiteSource>> {
        WebsiteSource::find_active(&self.pool).await
    }

    async fn record_run(&self, id: WebsiteSourceId, candidates_found: i64) -> Result<()> {
        WebsiteSource::record_run(id, candidates_found, &self.pool).await
    }
}
