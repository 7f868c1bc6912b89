pub mod app_config;
pub mod app_state;
pub mod database;
pub mod jwt_config;

pub use app_config::AppConfig;
pub use app_state::AppState;
pub use database::{run_migrations, DatabaseConfig};
pub use jwt_config::JwtConfig;
