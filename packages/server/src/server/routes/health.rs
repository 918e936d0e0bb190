use std::time::Duration;

use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;
use sqlx::PgPool;

use crate::server::app::AppState;

const DB_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    database: DatabaseProbe,
    pool: PoolStats,
    ingestion: IngestionHealth,
}

#[derive(Serialize)]
pub struct DatabaseProbe {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
pub struct PoolStats {
    size: u32,
    idle: usize,
    max: u32,
}

#[derive(Serialize)]
pub struct IngestionHealth {
    scraper_running: bool,
    telegram_configured: bool,
}

async fn probe_database(pool: &PgPool) -> DatabaseProbe {
    let error = match tokio::time::timeout(DB_PROBE_TIMEOUT, sqlx::query("SELECT 1").execute(pool))
        .await
    {
        Ok(Ok(_)) => None,
        Ok(Err(e)) => Some(format!("Query failed: {}", e)),
        Err(_) => Some(format!("Query timeout (>{}s)", DB_PROBE_TIMEOUT.as_secs())),
    };

    DatabaseProbe {
        ok: error.is_none(),
        error,
    }
}

/// 200 when the database answers within five seconds, 503 otherwise. An
/// unconfigured Telegram channel does not make the service unhealthy.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let database = probe_database(&state.db_pool).await;

    let (code, status) = if database.ok {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    let response = HealthResponse {
        status,
        database,
        pool: PoolStats {
            size: state.db_pool.size(),
            idle: state.db_pool.num_idle(),
            max: state.db_pool.options().get_max_connections(),
        },
        ingestion: IngestionHealth {
            scraper_running: state.coordinator.is_running(),
            telegram_configured: state.coordinator.deps().delivery.is_configured(),
        },
    };

    (code, Json(response))
}
