use axum::{
    extract::{Path, Query, State},
    Extension,
    Json,
};

use crate::config::AppState;
use crate::dto::{UpdateUserRequest, UserFilterQuery, UserResponse};
use crate::interceptors::{ApiSuccess, AppError};
use crate::models::AuthUser;
use crate::services::UserService;
use crate::utils::validate_request;

/// List all users
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<ApiSuccess<Vec<UserResponse>>, AppError> {
    let user_service = UserService::new(state.db, state.config);
    let users = user_service.list_users().await?;

    Ok(ApiSuccess::new("Users retrieved successfully", users))
}

/// Search users by email fragment
pub async fn filter_users(
    State(state): State<AppState>,
    Query(filter): Query<UserFilterQuery>,
) -> Result<ApiSuccess<Vec<UserResponse>>, AppError> {
    validate_request(&filter)?;

    let user_service = UserService::new(state.db, state.config);
    let users = user_service.find_by_email(&filter.email).await?;

    Ok(ApiSuccess::new("Users retrieved successfully", users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<ApiSuccess<UserResponse>, AppError> {
    let user_service = UserService::new(state.db, state.config);
    let user = user_service.get_user_by_id(&user_id).await?;

    Ok(ApiSuccess::new("User retrieved successfully", user))
}

/// Update user
pub async fn update_user(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Json(update_request): Json<UpdateUserRequest>,
) -> Result<ApiSuccess<UserResponse>, AppError> {
    let user_service = UserService::new(state.db, state.config);
    let updated_user = user_service.update_user(&actor, &user_id, update_request).await?;

    Ok(ApiSuccess::new("User updated successfully", updated_user))
}
