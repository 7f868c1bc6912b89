pub mod purchase_dto;
pub mod queue_dto;
pub mod user_dto;

pub use purchase_dto::PurchaseResponse;
pub use queue_dto::{CompleteQuery, CompletionResponse, JoinQueueRequest, QueueEntryResponse};
pub use user_dto::{
    CreateUserRequest,
    UpdateUserRequest,
    UserFilterQuery,
    UserProfile,
    UserResponse,
    LoginRequest,
    LoginResponse,
    RegisterResponse,
};
