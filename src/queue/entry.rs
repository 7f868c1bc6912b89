use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::QueueError;

pub type EntryId = String;

/// Things a queued user can order while waiting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Cafe,
    Filtro,
}

impl ItemKind {
    /// Column of the `fila` table holding this item's count
    pub(crate) fn column(&self) -> &'static str {
        match self {
            ItemKind::Cafe => "cafe",
            ItemKind::Filtro => "filtro",
        }
    }
}

impl FromStr for ItemKind {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cafe" | "coffee" => Ok(ItemKind::Cafe),
            "filtro" | "filter" => Ok(ItemKind::Filtro),
            _ => Err(QueueError::InvalidItemKind(s.to_string())),
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCounts {
    pub cafe: i64,
    pub filtro: i64,
}

impl ItemCounts {
    pub fn single(kind: ItemKind) -> Self {
        let mut counts = Self::default();
        match kind {
            ItemKind::Cafe => counts.cafe = 1,
            ItemKind::Filtro => counts.filtro = 1,
        }
        counts
    }

    pub fn is_empty(&self) -> bool {
        self.cafe == 0 && self.filtro == 0
    }
}

/// A user's slot in the line (row of `fila`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct QueueEntry {
    pub id: EntryId,
    pub usuario_id: String,
    pub posicao: i64,
    pub cafe: i64,
    pub filtro: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QueueEntry {
    pub fn new(usuario_id: &str, posicao: i64, counts: ItemCounts) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            usuario_id: usuario_id.to_string(),
            posicao,
            cafe: counts.cafe,
            filtro: counts.filtro,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn counts(&self) -> ItemCounts {
        ItemCounts {
            cafe: self.cafe,
            filtro: self.filtro,
        }
    }
}

/// Queue entry joined with its owner's public profile
#[derive(Debug, Clone, FromRow)]
pub struct QueueEntryWithUser {
    #[sqlx(flatten)]
    pub entry: QueueEntry,
    pub usuario_name: Option<String>,
    pub usuario_email: String,
}

/// Result of ordering an item: a fresh entry or a bump on the existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddItemOutcome {
    Created(QueueEntry),
    Incremented(QueueEntry),
}

impl AddItemOutcome {
    pub fn entry(&self) -> &QueueEntry {
        match self {
            AddItemOutcome::Created(entry) | AddItemOutcome::Incremented(entry) => entry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_kind_accepts_aliases_in_any_case() {
        assert_eq!("cafe".parse::<ItemKind>().unwrap(), ItemKind::Cafe);
        assert_eq!("Coffee".parse::<ItemKind>().unwrap(), ItemKind::Cafe);
        assert_eq!("FILTRO".parse::<ItemKind>().unwrap(), ItemKind::Filtro);
        assert_eq!("filter".parse::<ItemKind>().unwrap(), ItemKind::Filtro);
    }

    #[test]
    fn item_kind_rejects_unknown_values() {
        let err = "espresso".parse::<ItemKind>().unwrap_err();
        assert!(matches!(err, QueueError::InvalidItemKind(kind) if kind == "espresso"));
    }

    #[test]
    fn single_item_counts() {
        assert_eq!(ItemCounts::single(ItemKind::Filtro), ItemCounts { cafe: 0, filtro: 1 });
        assert!(ItemCounts::default().is_empty());
        assert!(!ItemCounts::single(ItemKind::Cafe).is_empty());
    }
}
