//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domains::ingestion::RunCoordinator;
use crate::server::routes::{
    health_handler, retry_posts_handler, scrape_handler, status_handler, test_telegram_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub coordinator: Arc<RunCoordinator>,
}

/// Build the Axum router. The trigger endpoints are unauthenticated.
pub fn build_app(state: AppState) -> Router {
    let scraper_routes = Router::new()
        .route("/scrape", post(scrape_handler))
        .route("/status", get(status_handler))
        .route("/retry-posts", post(retry_posts_handler))
        .route("/test-telegram", get(test_telegram_handler));

    Router::new()
        .nest("/api/scraper", scraper_routes)
        .route("/api/health", get(health_handler))
        .layer(Extension(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
