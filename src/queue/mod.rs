mod entry;
mod error;
mod queue_service;

pub use entry::{AddItemOutcome, ItemCounts, QueueEntry, QueueEntryWithUser};
pub use error::QueueError;
pub use queue_service::QueueService;
