use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::JobType;
use crate::common::JobPostingId;
use crate::domains::scraping::ExtractionCandidate;

/// A persisted job listing. One row per distinct fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobPosting {
    pub id: JobPostingId,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub description: String,
    pub apply_url: String,
    pub source: String,
    pub source_url: String,
    pub tags: Vec<String>,
    pub job_type: String,
    pub fingerprint: String,
    pub posted_message_id: Option<i64>,
    pub delivery_claimed_at: Option<DateTime<Utc>>,
    pub delivery_held: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Whether a posting has reached the notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryStatus {
    Unposted,
    Posted { message_id: i64 },
}

impl JobPosting {
    /// Builds the row a fresh insert of `candidate` would produce.
    pub fn from_candidate(candidate: &ExtractionCandidate, created_at: DateTime<Utc>) -> Self {
        Self {
            id: JobPostingId::new(),
            title: candidate.title.clone(),
            company: candidate.company.clone(),
            location: candidate.location.clone(),
            salary: candidate.salary.clone(),
            description: candidate.description.clone(),
            apply_url: candidate.apply_url.clone(),
            source: candidate.source.clone(),
            source_url: candidate.source_url.clone(),
            tags: candidate.tags.clone(),
            job_type: candidate.job_type.to_string(),
            fingerprint: candidate.fingerprint.clone(),
            posted_message_id: None,
            delivery_claimed_at: None,
            delivery_held: false,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn job_type(&self) -> JobType {
        self.job_type.parse().unwrap_or_default()
    }

    pub fn delivery_status(&self) -> DeliveryStatus {
        match self.posted_message_id {
            Some(message_id) => DeliveryStatus::Posted { message_id },
            None => DeliveryStatus::Unposted,
        }
    }

    pub fn is_posted(&self) -> bool {
        self.posted_message_id.is_some()
    }

    /// Unposted, not held, and either unclaimed or claimed at or before
    /// `claims_stale_before`.
    pub fn is_deliverable(&self, claims_stale_before: DateTime<Utc>) -> bool {
        self.posted_message_id.is_none()
            && !self.delivery_held
            && self
                .delivery_claimed_at
                .map_or(true, |claimed_at| claimed_at <= claims_stale_before)
    }

    pub async fn find_by_id(id: JobPostingId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM job_postings WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_fingerprint(fingerprint: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM job_postings WHERE fingerprint = $1")
            .bind(fingerprint)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Insert a new posting. Returns `None` when the fingerprint already
    /// exists, so two concurrent inserts of the same listing leave one row.
    pub async fn insert(candidate: &ExtractionCandidate, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO job_postings (
                id, title, company, location, salary, description, apply_url,
                source, source_url, tags, job_type, fingerprint
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (fingerprint) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(JobPostingId::new())
        .bind(&candidate.title)
        .bind(&candidate.company)
        .bind(&candidate.location)
        .bind(&candidate.salary)
        .bind(&candidate.description)
        .bind(&candidate.apply_url)
        .bind(&candidate.source)
        .bind(&candidate.source_url)
        .bind(&candidate.tags)
        .bind(candidate.job_type.as_str())
        .bind(&candidate.fingerprint)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Take the delivery claim. False when the posting is posted, held, or
    /// claimed after `claims_stale_before`. An older claim belongs to a
    /// worker that died or failed to release it, and is taken over.
    pub async fn claim_for_delivery(
        id: JobPostingId,
        claims_stale_before: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE job_postings
            SET delivery_claimed_at = NOW(), updated_at = NOW()
            WHERE id = $1
              AND posted_message_id IS NULL
              AND NOT delivery_held
              AND (delivery_claimed_at IS NULL OR delivery_claimed_at <= $2)
            "#,
        )
        .bind(id)
        .bind(claims_stale_before)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn release_claim(id: JobPostingId, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE job_postings
            SET delivery_claimed_at = NULL, updated_at = NOW()
            WHERE id = $1 AND posted_message_id IS NULL AND NOT delivery_held
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Pin the claim of a posting the channel accepted but whose message id
    /// could not be stored, so lease expiry never sends it again.
    pub async fn hold_delivery(id: JobPostingId, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE job_postings
            SET delivery_held = true, updated_at = NOW()
            WHERE id = $1 AND posted_message_id IS NULL
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn mark_posted(id: JobPostingId, message_id: i64, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE job_postings
            SET posted_message_id = $2,
                delivery_claimed_at = NULL,
                delivery_held = false,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(message_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Deliverable postings (see [`JobPosting::is_deliverable`]) created at or
    /// after `since`, oldest first.
    pub async fn find_unposted_since(
        since: DateTime<Utc>,
        claims_stale_before: DateTime<Utc>,
        limit: i64,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM job_postings
            WHERE posted_message_id IS NULL
              AND NOT delivery_held
              AND (delivery_claimed_at IS NULL OR delivery_claimed_at <= $2)
              AND created_at >= $1
            ORDER BY created_at ASC
            LIMIT $3
            "#,
        )
        .bind(since)
        .bind(claims_stale_before)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_candidate_starts_unposted() {
        let candidate = ExtractionCandidate::new(
            "Solidity Dev",
            "Acme",
            "https://acme.xyz/jobs/1",
            "Acme Careers",
            "https://acme.xyz/careers",
        );
        let posting = JobPosting::from_candidate(&candidate, Utc::now());

        assert_eq!(posting.fingerprint, candidate.fingerprint);
        assert_eq!(posting.delivery_status(), DeliveryStatus::Unposted);
        assert_eq!(posting.job_type(), JobType::Unknown);
        assert!(!posting.is_posted());
    }

    #[test]
    fn test_delivery_status_follows_message_id() {
        let candidate = ExtractionCandidate::new("A", "B", "https://b.io/a", "B", "https://b.io");
        let mut posting = JobPosting::from_candidate(&candidate, Utc::now());
        posting.posted_message_id = Some(42);

        assert_eq!(
            posting.delivery_status(),
            DeliveryStatus::Posted { message_id: 42 }
        );
    }

    #[test]
    fn test_claims_expire_but_holds_do_not() {
        let candidate = ExtractionCandidate::new("A", "B", "https://b.io/a", "B", "https://b.io");
        let now = Utc::now();
        let mut posting = JobPosting::from_candidate(&candidate, now);
        assert!(posting.is_deliverable(now - chrono::Duration::minutes(10)));

        posting.delivery_claimed_at = Some(now - chrono::Duration::minutes(5));
        assert!(!posting.is_deliverable(now - chrono::Duration::minutes(10)));
        assert!(posting.is_deliverable(now - chrono::Duration::minutes(1)));

        posting.delivery_held = true;
        assert!(!posting.is_deliverable(now));
    }
}
