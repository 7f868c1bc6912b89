use thiserror::Error;

/// Failures of the queue ordering engine
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("User is already in the queue")]
    AlreadyQueued,

    #[error("User is not in the queue")]
    NotQueued,

    #[error("Only the first user in the queue can complete a purchase")]
    NotFirst,

    #[error("No queue entry at position {0}")]
    NotFound(i64),

    #[error("Unknown item kind '{0}'")]
    InvalidItemKind(String),

    #[error("Only admins can reorder the queue")]
    Forbidden,

    #[error("User does not exist")]
    UnknownUser,

    #[error("Queue storage unavailable: {0}")]
    StorageUnavailable(#[from] sqlx::Error),
}
