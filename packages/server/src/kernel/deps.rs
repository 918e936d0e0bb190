//! Server dependencies for domain actions (using traits for testability)
//!
//! Every external system the ingestion workflow touches sits behind a trait
//! object here, so tests swap in the in-memory versions from
//! `test_dependencies`.

use sqlx::PgPool;
use std::sync::Arc;

use crate::kernel::stores::{PgJobStore, PgSourceRegistry};
use crate::kernel::{BaseDeliveryChannel, BaseJobExtractor, BaseJobStore, BaseSourceRegistry};

#[derive(Clone)]
pub struct ServerDeps {
    pub job_store: Arc<dyn BaseJobStore>,
    pub source_registry: Arc<dyn BaseSourceRegistry>,
    pub extractor: Arc<dyn BaseJobExtractor>,
    pub delivery: Arc<dyn BaseDeliveryChannel>,
}

impl ServerDeps {
    pub fn new(
        job_store: Arc<dyn BaseJobStore>,
        source_registry: Arc<dyn BaseSourceRegistry>,
        extractor: Arc<dyn BaseJobExtractor>,
        delivery: Arc<dyn BaseDeliveryChannel>,
    ) -> Self {
        Self {
            job_store,
            source_registry,
            extractor,
            delivery,
        }
    }

    /// Postgres-backed stores with the given extractor and channel.
    pub fn postgres(
        pool: PgPool,
        extractor: Arc<dyn BaseJobExtractor>,
        delivery: Arc<dyn BaseDeliveryChannel>,
    ) -> Self {
        Self::new(
            Arc::new(PgJobStore::new(pool.clone())),
            Arc::new(PgSourceRegistry::new(pool)),
            extractor,
            delivery,
        )
    }
}
