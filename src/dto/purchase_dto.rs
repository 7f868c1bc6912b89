use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserProfile;
use crate::models::{Purchase, PurchaseWithUser};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub id: String,
    pub usuario_id: String,
    pub cafe: i64,
    pub filtro: i64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usuario: Option<UserProfile>,
}

impl From<Purchase> for PurchaseResponse {
    fn from(purchase: Purchase) -> Self {
        Self {
            id: purchase.id,
            usuario_id: purchase.usuario_id,
            cafe: purchase.cafe,
            filtro: purchase.filtro,
            created_at: purchase.created_at,
            usuario: None,
        }
    }
}

impl From<PurchaseWithUser> for PurchaseResponse {
    fn from(row: PurchaseWithUser) -> Self {
        let profile = UserProfile {
            id: row.purchase.usuario_id.clone(),
            name: row.usuario_name,
            email: row.usuario_email,
        };

        Self {
            usuario: Some(profile),
            ..Self::from(row.purchase)
        }
    }
}
