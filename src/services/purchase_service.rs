use sqlx::{SqliteConnection, SqlitePool};

use crate::models::{Purchase, PurchaseWithUser};
use crate::queue::ItemCounts;

const PURCHASE_WITH_USER_SELECT: &str = "SELECT c.id, c.usuario_id, c.cafe, c.filtro, c.created_at, \
     u.name AS usuario_name, u.email AS usuario_email \
     FROM compras c JOIN users u ON u.id = c.usuario_id";

/// Ledger of completed purchases
#[derive(Clone)]
pub struct PurchaseService {
    db: SqlitePool,
}

impl PurchaseService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Newest first
    pub async fn list(&self) -> Result<Vec<PurchaseWithUser>, sqlx::Error> {
        let query = format!("{} ORDER BY c.created_at DESC", PURCHASE_WITH_USER_SELECT);
        sqlx::query_as::<_, PurchaseWithUser>(&query)
            .fetch_all(&self.db)
            .await
    }

    pub async fn list_for_user(&self, usuario_id: &str) -> Result<Vec<Purchase>, sqlx::Error> {
        sqlx::query_as::<_, Purchase>(
            "SELECT id, usuario_id, cafe, filtro, created_at FROM compras
             WHERE usuario_id = ?
             ORDER BY created_at DESC",
        )
        .bind(usuario_id)
        .fetch_all(&self.db)
        .await
    }

    /// Insert on the caller's connection, so the record commits together with
    /// the queue change that produced it.
    pub(crate) async fn record(
        conn: &mut SqliteConnection,
        usuario_id: &str,
        counts: ItemCounts,
    ) -> Result<Purchase, sqlx::Error> {
        let purchase = Purchase::new(usuario_id, counts);

        sqlx::query("INSERT INTO compras (id, usuario_id, cafe, filtro, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(&purchase.id)
            .bind(&purchase.usuario_id)
            .bind(purchase.cafe)
            .bind(purchase.filtro)
            .bind(purchase.created_at)
            .execute(&mut *conn)
            .await?;

        tracing::debug!("Recorded purchase {} for user {}", purchase.id, usuario_id);
        Ok(purchase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::database::memory_pool;
    use crate::test_support::seed_user;

    #[tokio::test]
    async fn test_record_and_list() {
        let pool = memory_pool().await;
        let alice = seed_user(&pool, "alice", false).await;
        let bob = seed_user(&pool, "bob", false).await;

        let mut conn = pool.acquire().await.unwrap();
        PurchaseService::record(&mut conn, &alice, ItemCounts { cafe: 2, filtro: 0 })
            .await
            .unwrap();
        PurchaseService::record(&mut conn, &bob, ItemCounts { cafe: 0, filtro: 1 })
            .await
            .unwrap();
        drop(conn);

        let ledger = PurchaseService::new(pool);
        let all = ledger.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|row| row.usuario_email == "alice@cafe.dev" && row.purchase.cafe == 2));

        let mine = ledger.list_for_user(&bob).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].filtro, 1);
    }
}
