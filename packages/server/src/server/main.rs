// Main entry point for the job aggregator server

use std::sync::Arc;

use anyhow::{Context, Result};
use server_core::domains::delivery::TelegramChannel;
use server_core::domains::ingestion::RunCoordinator;
use server_core::domains::scraping::{ExtractorConfig, SourceExtractor};
use server_core::kernel::{start_scheduler, ServerDeps};
use server_core::server::{build_app, AppState};
use server_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Web3 job aggregator");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    let extractor = SourceExtractor::new(ExtractorConfig {
        http_timeout: config.http_timeout(),
        browser_timeout: config.browser_timeout(),
        node_binary: config.node_binary.clone(),
    })?;

    let delivery = TelegramChannel::from_config(
        config.telegram_bot_token.as_deref(),
        config.telegram_chat_id.as_deref(),
        &config.telegram_api_url,
        config.http_timeout(),
    )
    .context("Failed to create Telegram client")?;

    let deps = ServerDeps::postgres(pool.clone(), Arc::new(extractor), Arc::new(delivery));
    let settings = config.run_settings()?;
    let coordinator = Arc::new(RunCoordinator::new(deps, settings));

    // Start scheduled tasks
    let scrape_cron = config.scrape_cron();
    let mut scheduler = start_scheduler(
        coordinator.clone(),
        &scrape_cron,
        config.retry_cron.as_deref(),
    )
    .await
    .context("Failed to start scheduler")?;

    let app = build_app(AppState {
        db_pool: pool,
        coordinator,
    });

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!(
        "Scraping every {} minutes ({})",
        config.scrape_interval_minutes,
        scrape_cron
    );
    tracing::info!("Health check: http://localhost:{}/api/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shutting down scheduler");
    scheduler
        .shutdown()
        .await
        .context("Failed to stop scheduler")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
