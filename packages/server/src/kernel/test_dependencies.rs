// TestDependencies - in-memory and mock implementations for testing
//
// Provides stores, an extractor and a delivery channel that can be injected
// into ServerDeps so the ingestion workflow runs without Postgres, the
// network or Telegram.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

use super::{
    BaseDeliveryChannel, BaseJobExtractor, BaseJobStore, BaseSourceRegistry, ServerDeps,
};
use crate::common::{JobPostingId, WebsiteSourceId};
use crate::domains::delivery::DeliveryError;
use crate::domains::ingestion::{RunCoordinator, RunSettings};
use crate::domains::jobs::JobPosting;
use crate::domains::scraping::ExtractionCandidate;
use crate::domains::source::models::NewWebsiteSource;
use crate::domains::source::{Selectors, WebsiteSource};

// =============================================================================
// Fixtures
// =============================================================================

/// An active generic source with a `.job` container selector.
pub fn test_source(name: &str, url: &str) -> WebsiteSource {
    let selectors = Selectors {
        container: Some(".job".to_string()),
        title: Some(".title".to_string()),
        link: Some("a".to_string()),
        ..Default::default()
    };
    NewWebsiteSource::generic(name, url, selectors).into_source(Utc::now())
}

// =============================================================================
// Memory Job Store
// =============================================================================

/// Job store with the same uniqueness and claim semantics as the Postgres one.
#[derive(Default)]
pub struct MemoryJobStore {
    postings: Mutex<Vec<JobPosting>>,
    fail_mark_posted: AtomicBool,
    release_failures: AtomicUsize,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `mark_posted` always errors.
    pub fn failing_mark_posted(self) -> Self {
        self.fail_mark_posted.store(true, Ordering::SeqCst);
        self
    }

    /// The next `times` calls to `release_claim` error and leave the claim.
    pub fn failing_release(self, times: usize) -> Self {
        self.release_failures.store(times, Ordering::SeqCst);
        self
    }

    /// Store a posting as if created at `created_at`.
    pub fn seed(&self, candidate: &ExtractionCandidate, created_at: DateTime<Utc>) -> JobPosting {
        let posting = JobPosting::from_candidate(candidate, created_at);
        self.postings.lock().unwrap().push(posting.clone());
        posting
    }

    pub fn postings(&self) -> Vec<JobPosting> {
        self.postings.lock().unwrap().clone()
    }

    pub fn get(&self, id: JobPostingId) -> Option<JobPosting> {
        self.postings
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.postings.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BaseJobStore for MemoryJobStore {
    async fn find_by_fingerprint(&self, fingerprint: &str) -> Result<Option<JobPosting>> {
        Ok(self
            .postings
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.fingerprint == fingerprint)
            .cloned())
    }

    async fn insert(&self, candidate: &ExtractionCandidate) -> Result<Option<JobPosting>> {
        let mut postings = self.postings.lock().unwrap();
        if postings.iter().any(|p| p.fingerprint == candidate.fingerprint) {
            return Ok(None);
        }
        let posting = JobPosting::from_candidate(candidate, Utc::now());
        postings.push(posting.clone());
        Ok(Some(posting))
    }

    async fn claim_for_delivery(
        &self,
        id: JobPostingId,
        claims_stale_before: DateTime<Utc>,
    ) -> Result<bool> {
        let mut postings = self.postings.lock().unwrap();
        match postings.iter_mut().find(|p| p.id == id) {
            Some(p) if p.is_deliverable(claims_stale_before) => {
                p.delivery_claimed_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release_claim(&self, id: JobPostingId) -> Result<()> {
        let failing = self
            .release_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            anyhow::bail!("database unavailable");
        }

        let mut postings = self.postings.lock().unwrap();
        if let Some(p) = postings
            .iter_mut()
            .find(|p| p.id == id && p.posted_message_id.is_none() && !p.delivery_held)
        {
            p.delivery_claimed_at = None;
        }
        Ok(())
    }

    async fn hold_delivery(&self, id: JobPostingId) -> Result<()> {
        let mut postings = self.postings.lock().unwrap();
        if let Some(p) = postings
            .iter_mut()
            .find(|p| p.id == id && p.posted_message_id.is_none())
        {
            p.delivery_held = true;
        }
        Ok(())
    }

    async fn mark_posted(&self, id: JobPostingId, message_id: i64) -> Result<()> {
        if self.fail_mark_posted.load(Ordering::SeqCst) {
            anyhow::bail!("database unavailable");
        }
        let mut postings = self.postings.lock().unwrap();
        if let Some(p) = postings.iter_mut().find(|p| p.id == id) {
            p.posted_message_id = Some(message_id);
            p.delivery_claimed_at = None;
            p.delivery_held = false;
            p.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn find_unposted_since(
        &self,
        since: DateTime<Utc>,
        claims_stale_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<JobPosting>> {
        let mut unposted: Vec<JobPosting> = self
            .postings
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.is_deliverable(claims_stale_before) && p.created_at >= since)
            .cloned()
            .collect();
        unposted.sort_by_key(|p| p.created_at);
        unposted.truncate(limit.max(0) as usize);
        Ok(unposted)
    }
}

// =============================================================================
// Memory Source Registry
// =============================================================================

#[derive(Default)]
pub struct MemorySourceRegistry {
    sources: Mutex<Vec<WebsiteSource>>,
    fail_listing: AtomicBool,
}

impl MemorySourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(self, source: WebsiteSource) -> Self {
        self.sources.lock().unwrap().push(source);
        self
    }

    /// `list_active` always errors.
    pub fn failing(self) -> Self {
        self.fail_listing.store(true, Ordering::SeqCst);
        self
    }

    pub fn get(&self, id: WebsiteSourceId) -> Option<WebsiteSource> {
        self.sources
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }
}

#[async_trait]
impl BaseSourceRegistry for MemorySourceRegistry {
    async fn list_active(&self) -> Result<Vec<WebsiteSource>> {
        if self.fail_listing.load(Ordering::SeqCst) {
            anyhow::bail!("connection refused");
        }
        Ok(self
            .sources
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.active)
            .cloned()
            .collect())
    }

    async fn record_run(&self, id: WebsiteSourceId, candidates_found: i64) -> Result<()> {
        let mut sources = self.sources.lock().unwrap();
        if let Some(source) = sources.iter_mut().find(|s| s.id == id) {
            source.last_scraped_at = Some(Utc::now());
            source.jobs_found += candidates_found;
        }
        Ok(())
    }
}

// =============================================================================
// Mock Extractor
// =============================================================================

/// Returns canned candidates per source name. Unknown sources yield nothing.
#[derive(Default)]
pub struct MockExtractor {
    responses: Mutex<HashMap<String, std::result::Result<Vec<ExtractionCandidate>, String>>>,
    calls: Mutex<Vec<String>>,
    gate: Option<Arc<Semaphore>>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candidates(self, source_name: &str, candidates: Vec<ExtractionCandidate>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(source_name.to_string(), Ok(candidates));
        self
    }

    pub fn with_error(self, source_name: &str, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(source_name.to_string(), Err(message.to_string()));
        self
    }

    /// Every extraction waits for a permit on `gate` first.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Source names in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseJobExtractor for MockExtractor {
    async fn extract(&self, source: &WebsiteSource) -> Result<Vec<ExtractionCandidate>> {
        self.calls.lock().unwrap().push(source.name.clone());

        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await?;
        }

        let response = self.responses.lock().unwrap().get(&source.name).cloned();
        match response {
            Some(Ok(candidates)) => Ok(candidates),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Ok(Vec::new()),
        }
    }
}

// =============================================================================
// Mock Delivery Channel
// =============================================================================

/// A message accepted by the mock channel.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub posting_id: JobPostingId,
    pub title: String,
    pub message_id: i64,
}

pub struct MockDeliveryChannel {
    configured: bool,
    fail_all: AtomicBool,
    fail_titles: Mutex<HashSet<String>>,
    next_message_id: AtomicI64,
    sent: Mutex<Vec<SentMessage>>,
}

impl Default for MockDeliveryChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDeliveryChannel {
    pub fn new() -> Self {
        Self {
            configured: true,
            fail_all: AtomicBool::new(false),
            fail_titles: Mutex::new(HashSet::new()),
            next_message_id: AtomicI64::new(1000),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    /// Reject every post until `set_failing(false)`.
    pub fn set_failing(&self, failing: bool) {
        self.fail_all.store(failing, Ordering::SeqCst);
    }

    /// Reject posts of the posting with this title.
    pub fn fail_for(self, title: &str) -> Self {
        self.fail_titles.lock().unwrap().insert(title.to_string());
        self
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_titles(&self) -> Vec<String> {
        self.sent().into_iter().map(|m| m.title).collect()
    }
}

#[async_trait]
impl BaseDeliveryChannel for MockDeliveryChannel {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn post_job(&self, posting: &JobPosting) -> std::result::Result<Option<i64>, DeliveryError> {
        if !self.configured {
            return Ok(None);
        }

        if self.fail_all.load(Ordering::SeqCst)
            || self.fail_titles.lock().unwrap().contains(&posting.title)
        {
            return Err(DeliveryError::Telegram(telegram::TelegramError::Api {
                code: 400,
                description: "Bad Request: can't parse entities".to_string(),
            }));
        }

        let message_id = self.next_message_id.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(SentMessage {
            posting_id: posting.id,
            title: posting.title.clone(),
            message_id,
        });
        Ok(Some(message_id))
    }

    async fn test_connection(&self) -> std::result::Result<String, DeliveryError> {
        if self.configured {
            Ok("test_bot".to_string())
        } else {
            Err(DeliveryError::NotConfigured)
        }
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Bundles the in-memory dependencies while keeping typed handles for
/// assertions.
pub struct TestDependencies {
    pub job_store: Arc<MemoryJobStore>,
    pub source_registry: Arc<MemorySourceRegistry>,
    pub extractor: Arc<MockExtractor>,
    pub delivery: Arc<MockDeliveryChannel>,
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            job_store: Arc::new(MemoryJobStore::new()),
            source_registry: Arc::new(MemorySourceRegistry::new()),
            extractor: Arc::new(MockExtractor::new()),
            delivery: Arc::new(MockDeliveryChannel::new()),
        }
    }

    pub fn with_job_store(mut self, job_store: MemoryJobStore) -> Self {
        self.job_store = Arc::new(job_store);
        self
    }

    pub fn with_sources(mut self, registry: MemorySourceRegistry) -> Self {
        self.source_registry = Arc::new(registry);
        self
    }

    pub fn with_extractor(mut self, extractor: MockExtractor) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    pub fn with_delivery(mut self, delivery: MockDeliveryChannel) -> Self {
        self.delivery = Arc::new(delivery);
        self
    }

    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.job_store.clone(),
            self.source_registry.clone(),
            self.extractor.clone(),
            self.delivery.clone(),
        )
    }

    /// No pacing delay, default retry window and batch size.
    pub fn settings() -> RunSettings {
        RunSettings {
            delivery_delay: Duration::ZERO,
            ..RunSettings::default()
        }
    }

    pub fn coordinator(&self) -> Arc<RunCoordinator> {
        self.coordinator_with(Self::settings())
    }

    pub fn coordinator_with(&self, settings: RunSettings) -> Arc<RunCoordinator> {
        Arc::new(RunCoordinator::new(self.server_deps(), settings))
    }
}
