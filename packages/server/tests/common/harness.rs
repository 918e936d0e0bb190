//! Postgres for the store tests.
//!
//! A single container is started on first use and migrated once; each test
//! gets its own pool over it. Docker is required, so these tests are
//! `#[ignore]`d by default: `cargo test -- --ignored`.

use anyhow::{Context, Result};
use server_core::kernel::{PgJobStore, PgSourceRegistry};
use sqlx::PgPool;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Connection URL plus the container that must outlive every test.
static DATABASE: OnceCell<(String, ContainerAsync<Postgres>)> = OnceCell::const_new();

async fn start_database() -> Result<(String, ContainerAsync<Postgres>)> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let container = Postgres::default()
        .with_tag("16")
        .start()
        .await
        .context("Failed to start Postgres container")?;
    let url = format!(
        "postgresql://postgres:postgres@{}:{}/postgres",
        container.get_host().await?,
        container.get_host_port_ipv4(5432).await?
    );

    let pool = PgPool::connect(&url).await.context("Failed to connect for migrations")?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    pool.close().await;

    Ok((url, container))
}

async fn database_url() -> &'static str {
    let (url, _) = DATABASE
        .get_or_init(|| async { start_database().await.expect("Postgres test database") })
        .await;
    url
}

/// ```ignore
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// #[ignore = "requires docker"]
/// async fn my_test(ctx: &TestHarness) {
///     let store = ctx.job_store();
/// }
/// ```
pub struct TestHarness {
    pub db_pool: PgPool,
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let db_pool = PgPool::connect(database_url().await)
            .await
            .context("Failed to connect to test database")?;
        Ok(Self { db_pool })
    }

    pub fn job_store(&self) -> PgJobStore {
        PgJobStore::new(self.db_pool.clone())
    }

    pub fn source_registry(&self) -> PgSourceRegistry {
        PgSourceRegistry::new(self.db_pool.clone())
    }
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        self.db_pool.close().await;
    }
}
