use std::sync::Arc;

use chrono::Utc;
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tokio::sync::Mutex;

use crate::config::AppState;
use crate::models::{AuthUser, Purchase};
use crate::services::PurchaseService;
use super::entry::{AddItemOutcome, ItemCounts, ItemKind, QueueEntry, QueueEntryWithUser};
use super::QueueError;

const ENTRY_COLUMNS: &str = "id, usuario_id, posicao, cafe, filtro, created_at, updated_at";

const ENTRY_WITH_USER_SELECT: &str = "SELECT f.id, f.usuario_id, f.posicao, f.cafe, f.filtro, \
     f.created_at, f.updated_at, u.name AS usuario_name, u.email AS usuario_email \
     FROM fila f JOIN users u ON u.id = f.usuario_id";

/// What a completed purchase did to the queue
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    /// Fresh entry at the tail, absent when the user chose not to re-enter
    pub entry: Option<QueueEntry>,
    /// Ledger record of the items the entry carried, absent when it had none
    pub purchase: Option<Purchase>,
}

impl CompletionOutcome {
    pub fn nova_posicao(&self) -> Option<i64> {
        self.entry.as_ref().map(|entry| entry.posicao)
    }
}

/// Queue ordering engine.
///
/// Positions always form `1..=count`. Every mutation takes the shared queue
/// lock and runs inside one transaction; returning early with an error drops
/// the transaction, which rolls it back.
#[derive(Clone)]
pub struct QueueService {
    db: SqlitePool,
    lock: Arc<Mutex<()>>,
}

impl QueueService {
    pub fn new(db: SqlitePool, lock: Arc<Mutex<()>>) -> Self {
        Self { db, lock }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.db.clone(), state.queue_lock.clone())
    }

    /// All entries in service order, with their owners' profiles
    pub async fn list(&self) -> Result<Vec<QueueEntryWithUser>, QueueError> {
        let query = format!("{} ORDER BY f.posicao ASC", ENTRY_WITH_USER_SELECT);
        let entries = sqlx::query_as::<_, QueueEntryWithUser>(&query)
            .fetch_all(&self.db)
            .await?;

        Ok(entries)
    }

    pub async fn find_by_position(&self, posicao: i64) -> Result<QueueEntryWithUser, QueueError> {
        let query = format!("{} WHERE f.posicao = ?", ENTRY_WITH_USER_SELECT);
        sqlx::query_as::<_, QueueEntryWithUser>(&query)
            .bind(posicao)
            .fetch_optional(&self.db)
            .await?
            .ok_or(QueueError::NotFound(posicao))
    }

    /// Append the user at the tail
    pub async fn join(&self, usuario_id: &str) -> Result<QueueEntry, QueueError> {
        let _guard = self.lock.lock().await;
        let mut tx = self.begin_write().await?;

        if Self::entry_for_user(&mut tx, usuario_id).await?.is_some() {
            return Err(QueueError::AlreadyQueued);
        }

        let entry = Self::append(&mut tx, usuario_id, ItemCounts::default()).await?;
        tx.commit().await?;

        tracing::info!("User {} joined the queue at position {}", usuario_id, entry.posicao);
        Ok(entry)
    }

    /// Order one item. Users not yet queued are appended at the tail.
    pub async fn add_item(&self, usuario_id: &str, item: &str) -> Result<AddItemOutcome, QueueError> {
        let kind: ItemKind = item.parse()?;

        let _guard = self.lock.lock().await;
        let mut tx = self.begin_write().await?;

        let outcome = match Self::entry_for_user(&mut tx, usuario_id).await? {
            Some(entry) => {
                let query = format!(
                    "UPDATE fila SET {col} = {col} + 1, updated_at = ? WHERE id = ? RETURNING {cols}",
                    col = kind.column(),
                    cols = ENTRY_COLUMNS,
                );
                let updated = sqlx::query_as::<_, QueueEntry>(&query)
                    .bind(Utc::now())
                    .bind(&entry.id)
                    .fetch_one(&mut *tx)
                    .await?;

                AddItemOutcome::Incremented(updated)
            }
            None => {
                let created = Self::append(&mut tx, usuario_id, ItemCounts::single(kind)).await?;
                AddItemOutcome::Created(created)
            }
        };

        tx.commit().await?;

        tracing::info!(
            "User {} ordered {} (position {})",
            usuario_id,
            kind,
            outcome.entry().posicao
        );
        Ok(outcome)
    }

    /// Remove the user and shift everyone behind them one slot forward
    pub async fn leave(&self, usuario_id: &str) -> Result<QueueEntry, QueueError> {
        let _guard = self.lock.lock().await;
        let mut tx = self.begin_write().await?;

        let entry = Self::entry_for_user(&mut tx, usuario_id)
            .await?
            .ok_or(QueueError::NotQueued)?;

        Self::remove_and_close_gap(&mut tx, &entry).await?;
        tx.commit().await?;

        tracing::info!("User {} left the queue from position {}", usuario_id, entry.posicao);
        Ok(entry)
    }

    /// Move the user to position 2, right behind whoever is being served.
    /// Entries already at 1 or 2 are left alone.
    pub async fn advance_to_front(
        &self,
        actor: &AuthUser,
        usuario_id: &str,
    ) -> Result<QueueEntry, QueueError> {
        if !actor.is_admin {
            return Err(QueueError::Forbidden);
        }

        let _guard = self.lock.lock().await;
        let mut tx = self.begin_write().await?;

        let entry = Self::entry_for_user(&mut tx, usuario_id)
            .await?
            .ok_or(QueueError::NotQueued)?;

        if entry.posicao <= 2 {
            return Ok(entry);
        }

        let now = Utc::now();
        sqlx::query("UPDATE fila SET posicao = posicao + 1, updated_at = ? WHERE posicao >= 2 AND posicao < ?")
            .bind(now)
            .bind(entry.posicao)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "UPDATE fila SET posicao = 2, updated_at = ? WHERE id = ? RETURNING {}",
            ENTRY_COLUMNS
        );
        let moved = sqlx::query_as::<_, QueueEntry>(&query)
            .bind(now)
            .bind(&entry.id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Admin {} advanced user {} from position {} to 2",
            actor.id,
            usuario_id,
            entry.posicao
        );
        Ok(moved)
    }

    /// Close out the head of the queue: record what it ordered, remove it and,
    /// when `requeue` is set, append a fresh entry for the same user at the tail.
    pub async fn complete_and_requeue(
        &self,
        usuario_id: &str,
        requeue: bool,
    ) -> Result<CompletionOutcome, QueueError> {
        let _guard = self.lock.lock().await;
        let mut tx = self.begin_write().await?;

        let entry = Self::entry_for_user(&mut tx, usuario_id)
            .await?
            .ok_or(QueueError::NotQueued)?;

        if entry.posicao != 1 {
            return Err(QueueError::NotFirst);
        }

        Self::remove_and_close_gap(&mut tx, &entry).await?;

        let counts = entry.counts();
        let purchase = if counts.is_empty() {
            None
        } else {
            Some(PurchaseService::record(&mut tx, usuario_id, counts).await?)
        };

        let requeued = if requeue {
            Some(Self::append(&mut tx, usuario_id, ItemCounts::default()).await?)
        } else {
            None
        };

        tx.commit().await?;

        let outcome = CompletionOutcome {
            entry: requeued,
            purchase,
        };
        match outcome.nova_posicao() {
            Some(posicao) => {
                tracing::info!("User {} completed a purchase, requeued at position {}", usuario_id, posicao)
            }
            None => tracing::info!("User {} completed a purchase and left the queue", usuario_id),
        }
        Ok(outcome)
    }

    /// Take SQLite's write lock when the transaction opens. A deferred
    /// transaction that reads first fails with SQLITE_BUSY on upgrade if
    /// another connection committed meanwhile, skipping `busy_timeout`.
    async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.db.begin_with("BEGIN IMMEDIATE").await
    }

    async fn entry_for_user(
        conn: &mut SqliteConnection,
        usuario_id: &str,
    ) -> Result<Option<QueueEntry>, sqlx::Error> {
        let query = format!("SELECT {} FROM fila WHERE usuario_id = ?", ENTRY_COLUMNS);
        sqlx::query_as::<_, QueueEntry>(&query)
            .bind(usuario_id)
            .fetch_optional(conn)
            .await
    }

    /// Shared by join, add_item and complete_and_requeue: the tail position is
    /// read and claimed on the same connection inside the caller's transaction.
    async fn append(
        conn: &mut SqliteConnection,
        usuario_id: &str,
        counts: ItemCounts,
    ) -> Result<QueueEntry, QueueError> {
        let user_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
            .bind(usuario_id)
            .fetch_one(&mut *conn)
            .await?;

        if !user_exists {
            return Err(QueueError::UnknownUser);
        }

        let last: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(posicao), 0) FROM fila")
            .fetch_one(&mut *conn)
            .await?;

        let entry = QueueEntry::new(usuario_id, last + 1, counts);

        let query = format!(
            "INSERT INTO fila ({cols}) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {cols}",
            cols = ENTRY_COLUMNS
        );
        let inserted = sqlx::query_as::<_, QueueEntry>(&query)
            .bind(&entry.id)
            .bind(&entry.usuario_id)
            .bind(entry.posicao)
            .bind(entry.cafe)
            .bind(entry.filtro)
            .bind(entry.created_at)
            .bind(entry.updated_at)
            .fetch_one(&mut *conn)
            .await?;

        Ok(inserted)
    }

    async fn remove_and_close_gap(
        conn: &mut SqliteConnection,
        entry: &QueueEntry,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM fila WHERE id = ?")
            .bind(&entry.id)
            .execute(&mut *conn)
            .await?;

        sqlx::query("UPDATE fila SET posicao = posicao - 1, updated_at = ? WHERE posicao > ?")
            .bind(Utc::now())
            .bind(entry.posicao)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}
