//! Manual triggers for the scrape and retry workflows.

use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::domains::ingestion::{RetryOutcome, RunStatus};
use crate::server::app::AppState;

#[derive(Serialize)]
pub struct ScrapeResponse {
    pub status: RunStatus,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub is_running: bool,
}

#[derive(Serialize)]
pub struct TestTelegramResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Start a run in the background and return immediately.
pub async fn scrape_handler(Extension(state): Extension<AppState>) -> Json<ScrapeResponse> {
    Json(ScrapeResponse {
        status: state.coordinator.start_run(),
    })
}

pub async fn status_handler(Extension(state): Extension<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        is_running: state.coordinator.is_running(),
    })
}

pub async fn retry_posts_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<RetryOutcome>, (StatusCode, Json<ErrorResponse>)> {
    state.coordinator.retry_unposted().await.map(Json).map_err(|e| {
        tracing::error!("Retry of unposted jobs failed: {:#}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("{:#}", e),
            }),
        )
    })
}

pub async fn test_telegram_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<TestTelegramResponse>) {
    match state.coordinator.test_connection().await {
        Ok(bot_name) => (
            StatusCode::OK,
            Json(TestTelegramResponse {
                success: true,
                bot_name: Some(bot_name),
                error: None,
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(TestTelegramResponse {
                success: false,
                bot_name: None,
                error: Some(e.to_string()),
            }),
        ),
    }
}
