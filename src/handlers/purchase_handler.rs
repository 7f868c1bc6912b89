use axum::{extract::State, Extension};

use crate::config::AppState;
use crate::dto::PurchaseResponse;
use crate::interceptors::{ApiSuccess, AppError};
use crate::models::AuthUser;
use crate::services::PurchaseService;

pub async fn list_purchases(
    State(state): State<AppState>,
) -> Result<ApiSuccess<Vec<PurchaseResponse>>, AppError> {
    let purchases = PurchaseService::new(state.db).list().await?;
    let data: Vec<_> = purchases.into_iter().map(PurchaseResponse::from).collect();

    Ok(ApiSuccess::new("Purchases retrieved successfully", data))
}

/// Purchases of the authenticated user
pub async fn my_purchases(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
) -> Result<ApiSuccess<Vec<PurchaseResponse>>, AppError> {
    let purchases = PurchaseService::new(state.db).list_for_user(&actor.id).await?;
    let data: Vec<_> = purchases.into_iter().map(PurchaseResponse::from).collect();

    Ok(ApiSuccess::new("Purchases retrieved successfully", data))
}
