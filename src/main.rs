mod config;
mod dto;
mod handlers;
mod interceptors;
mod middleware;
mod models;
mod queue;
mod routes;
mod services;
mod utils;

#[cfg(test)]
mod test_support;

use anyhow::Context;
use config::{run_migrations, AppConfig, AppState, DatabaseConfig};
use middleware::setup_logging;
use routes::create_router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup logging
    let _log_guard = setup_logging();

    tracing::info!("Starting application...");

    // Load configurations
    let app_config = AppConfig::from_env().context("failed to load application config")?;
    let db_config = DatabaseConfig::from_env().context("failed to load database config")?;

    tracing::info!("Loaded configuration for environment: {}", app_config.environment);

    // Create database connection pool
    let db_pool = db_config
        .create_pool()
        .await
        .with_context(|| format!("failed to open database at {}", db_config.url))?;
    tracing::info!("Database connection pool created");

    run_migrations(&db_pool).await.context("failed to run migrations")?;
    tracing::info!("Database migrations applied");

    // Create AppState
    let app_state = AppState::new(db_pool, app_config.clone());

    // Create router
    let app = create_router(app_state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    // Create server address
    let addr = app_config.server_address();
    tracing::info!("Server starting on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!(
        "{} v{} is running on {}",
        app_config.app_name,
        app_config.app_version,
        addr
    );

    axum::serve(listener, app).await?;

    Ok(())
}
