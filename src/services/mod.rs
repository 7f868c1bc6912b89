pub mod purchase_service;
pub mod user_service;

pub use purchase_service::PurchaseService;
pub use user_service::{UserDirectory, UserService};

#[cfg(test)]
pub use user_service::MockUserDirectory;
