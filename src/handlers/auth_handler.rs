use axum::{extract::State, Json};

use crate::config::AppState;
use crate::dto::{CreateUserRequest, LoginRequest, LoginResponse, RegisterResponse};
use crate::interceptors::{ApiSuccess, AppError};
use crate::services::UserService;

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<ApiSuccess<RegisterResponse>, AppError> {
    let user_service = UserService::new(state.db, state.config);
    let response = user_service.register(request).await?;

    Ok(ApiSuccess::new("User registered successfully", response).created())
}

/// Login user
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<ApiSuccess<LoginResponse>, AppError> {
    let user_service = UserService::new(state.db, state.config);
    let response = user_service.login(request).await?;

    Ok(ApiSuccess::new("Login successful", response))
}
