use std::sync::Arc;
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::services::{UserDirectory, UserService};

/// Application state shared across all handlers and services
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Resolves bearer tokens to users
    pub directory: Arc<dyn UserDirectory>,
    /// Serializes every mutation of the queue ordering
    pub queue_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Create new AppState backed by the database user directory
    pub fn new(db: SqlitePool, config: AppConfig) -> Self {
        let config = Arc::new(config);
        let directory = Arc::new(UserService::new(db.clone(), config.clone()));

        Self::with_directory(db, config, directory)
    }

    pub fn with_directory(
        db: SqlitePool,
        config: Arc<AppConfig>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            db,
            config,
            directory,
            queue_lock: Arc::new(Mutex::new(())),
        }
    }
}
