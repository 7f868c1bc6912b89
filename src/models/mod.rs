pub mod purchase;
pub mod user;

pub use purchase::{Purchase, PurchaseWithUser};
pub use user::{AuthUser, User};
