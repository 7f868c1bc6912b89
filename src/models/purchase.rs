use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::queue::ItemCounts;

/// A completed purchase (row of `compras`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Purchase {
    pub id: String,
    pub usuario_id: String,
    pub cafe: i64,
    pub filtro: i64,
    pub created_at: DateTime<Utc>,
}

impl Purchase {
    pub fn new(usuario_id: &str, counts: ItemCounts) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            usuario_id: usuario_id.to_string(),
            cafe: counts.cafe,
            filtro: counts.filtro,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PurchaseWithUser {
    #[sqlx(flatten)]
    pub purchase: Purchase,
    pub usuario_name: Option<String>,
    pub usuario_email: String,
}
