use axum::{
    extract::{Path, Query, State},
    Extension,
    Json,
};

use crate::config::AppState;
use crate::dto::{CompleteQuery, CompletionResponse, JoinQueueRequest, QueueEntryResponse};
use crate::interceptors::{ApiSuccess, AppError};
use crate::models::AuthUser;
use crate::queue::{AddItemOutcome, QueueService};
use crate::utils::validate_request;

fn ensure_can_act_for(actor: &AuthUser, usuario_id: &str) -> Result<(), AppError> {
    if actor.can_act_for(usuario_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden("Cannot change another user's place in the queue".to_string()))
    }
}

/// Queue in service order
pub async fn list_queue(
    State(state): State<AppState>,
) -> Result<ApiSuccess<Vec<QueueEntryResponse>>, AppError> {
    let entries = QueueService::from_state(&state).list().await?;
    let data: Vec<_> = entries.into_iter().map(QueueEntryResponse::from).collect();

    Ok(ApiSuccess::new("Queue retrieved successfully", data))
}

pub async fn find_by_position(
    State(state): State<AppState>,
    Path(posicao): Path<i64>,
) -> Result<ApiSuccess<QueueEntryResponse>, AppError> {
    let entry = QueueService::from_state(&state).find_by_position(posicao).await?;

    Ok(ApiSuccess::new("Queue entry retrieved successfully", QueueEntryResponse::from(entry)))
}

pub async fn join_queue(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Json(request): Json<JoinQueueRequest>,
) -> Result<ApiSuccess<QueueEntryResponse>, AppError> {
    validate_request(&request)?;
    ensure_can_act_for(&actor, &request.usuario_id)?;

    let entry = QueueService::from_state(&state).join(&request.usuario_id).await?;

    Ok(ApiSuccess::new("User joined the queue", QueueEntryResponse::from(entry)).created())
}

/// Order an item for the caller, joining the queue if needed
pub async fn add_item(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(item): Path<String>,
) -> Result<ApiSuccess<QueueEntryResponse>, AppError> {
    let outcome = QueueService::from_state(&state).add_item(&actor.id, &item).await?;

    let response = match outcome {
        AddItemOutcome::Created(entry) => {
            ApiSuccess::new("Item ordered and user joined the queue", QueueEntryResponse::from(entry)).created()
        }
        AddItemOutcome::Incremented(entry) => ApiSuccess::new("Item added to order", QueueEntryResponse::from(entry)),
    };

    Ok(response)
}

/// Admin only: move a user right behind the head of the queue
pub async fn advance_to_front(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(usuario_id): Path<String>,
) -> Result<ApiSuccess<QueueEntryResponse>, AppError> {
    let entry = QueueService::from_state(&state)
        .advance_to_front(&actor, &usuario_id)
        .await?;

    Ok(ApiSuccess::new("User advanced in the queue", QueueEntryResponse::from(entry)))
}

/// Finish the head's purchase and send them to the tail
pub async fn complete_purchase(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(usuario_id): Path<String>,
    Query(query): Query<CompleteQuery>,
) -> Result<ApiSuccess<CompletionResponse>, AppError> {
    ensure_can_act_for(&actor, &usuario_id)?;

    let outcome = QueueService::from_state(&state)
        .complete_and_requeue(&usuario_id, query.reentrar)
        .await?;

    let message = if outcome.entry.is_some() {
        "Purchase completed and user moved to the end of the queue"
    } else {
        "Purchase completed and user left the queue"
    };
    let response = CompletionResponse {
        nova_posicao: outcome.nova_posicao(),
        compra: outcome.purchase.map(Into::into),
    };

    Ok(ApiSuccess::new(message, response))
}

pub async fn leave_queue(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(usuario_id): Path<String>,
) -> Result<ApiSuccess<()>, AppError> {
    ensure_can_act_for(&actor, &usuario_id)?;

    QueueService::from_state(&state).leave(&usuario_id).await?;

    Ok(ApiSuccess::<()>::new_without_data("User removed from the queue"))
}
