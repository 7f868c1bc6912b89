use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{PurchaseResponse, UserProfile};
use crate::queue::{QueueEntry, QueueEntryWithUser};

/// Body of `POST /fila/entrar`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct JoinQueueRequest {
    #[validate(length(min = 1, message = "usuario_id is required"))]
    pub usuario_id: String,
}

/// Query string of `PATCH /fila/concluir/:usuario_id`
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteQuery {
    #[serde(default = "default_reentrar")]
    pub reentrar: bool,
}

fn default_reentrar() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntryResponse {
    pub id: String,
    pub usuario_id: String,
    pub posicao: i64,
    pub cafe: i64,
    pub filtro: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usuario: Option<UserProfile>,
}

impl From<QueueEntry> for QueueEntryResponse {
    fn from(entry: QueueEntry) -> Self {
        Self {
            id: entry.id,
            usuario_id: entry.usuario_id,
            posicao: entry.posicao,
            cafe: entry.cafe,
            filtro: entry.filtro,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
            usuario: None,
        }
    }
}

impl From<QueueEntryWithUser> for QueueEntryResponse {
    fn from(row: QueueEntryWithUser) -> Self {
        let profile = UserProfile {
            id: row.entry.usuario_id.clone(),
            name: row.usuario_name,
            email: row.usuario_email,
        };

        Self {
            usuario: Some(profile),
            ..Self::from(row.entry)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    /// Absent when the user did not re-enter the queue
    pub nova_posicao: Option<i64>,
    pub compra: Option<PurchaseResponse>,
}
