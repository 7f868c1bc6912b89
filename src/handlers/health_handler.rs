use axum::extract::State;
use serde_json::{json, Value};

use crate::config::AppState;
use crate::interceptors::{ApiSuccess, AppError};

/// Health check endpoint, including a round trip to the database
pub async fn health_check(State(state): State<AppState>) -> Result<ApiSuccess<Value>, AppError> {
    sqlx::query("SELECT 1").execute(&state.db).await?;

    let data = json!({
        "status": "ok",
        "version": state.config.app_version,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(ApiSuccess::new("Service is healthy", data))
}
