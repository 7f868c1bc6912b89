pub mod auth_handler;
pub mod health_handler;
pub mod purchase_handler;
pub mod queue_handler;
pub mod user_handler;

pub use auth_handler::{login, register};
pub use health_handler::health_check;
pub use purchase_handler::{list_purchases, my_purchases};
pub use queue_handler::{add_item, advance_to_front, complete_purchase, find_by_position, join_queue, leave_queue, list_queue};
pub use user_handler::{filter_users, get_user, list_users, update_user};
