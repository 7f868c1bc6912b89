use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use thiserror::Error;
use serde_json::json;

use super::response::{ApiError, ApiResponse};
use crate::queue::QueueError;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// Error codes for API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    DatabaseError,
    ValidationError,
    NotFound,
    InternalError,
    Unauthorized,
    Forbidden,
    Conflict,
    JwtError,
    AlreadyQueued,
    NotQueued,
    NotFirst,
    InvalidItemKind,
    UnknownUser,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::JwtError => "JWT_ERROR",
            ErrorCode::AlreadyQueued => "ALREADY_QUEUED",
            ErrorCode::NotQueued => "NOT_QUEUED",
            ErrorCode::NotFirst => "NOT_FIRST",
            ErrorCode::InvalidItemKind => "INVALID_ITEM_KIND",
            ErrorCode::UnknownUser => "UNKNOWN_USER",
        }
    }
}

impl AppError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::DatabaseError(_) => ErrorCode::DatabaseError,
            AppError::ValidationError(_) => ErrorCode::ValidationError,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::InternalError(_) => ErrorCode::InternalError,
            AppError::Unauthorized(_) => ErrorCode::Unauthorized,
            AppError::Forbidden(_) => ErrorCode::Forbidden,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::JwtError(_) => ErrorCode::JwtError,
            AppError::Queue(err) => match err {
                QueueError::AlreadyQueued => ErrorCode::AlreadyQueued,
                QueueError::NotQueued => ErrorCode::NotQueued,
                QueueError::NotFirst => ErrorCode::NotFirst,
                QueueError::NotFound(_) => ErrorCode::NotFound,
                QueueError::InvalidItemKind(_) => ErrorCode::InvalidItemKind,
                QueueError::Forbidden => ErrorCode::Forbidden,
                QueueError::UnknownUser => ErrorCode::UnknownUser,
                QueueError::StorageUnavailable(_) => ErrorCode::DatabaseError,
            },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::Queue(err) => match err {
                QueueError::AlreadyQueued | QueueError::InvalidItemKind(_) => StatusCode::BAD_REQUEST,
                QueueError::NotQueued | QueueError::NotFound(_) | QueueError::UnknownUser => {
                    StatusCode::NOT_FOUND
                }
                QueueError::NotFirst | QueueError::Forbidden => StatusCode::FORBIDDEN,
                QueueError::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn to_api_error(&self) -> ApiError {
        let error_code = self.error_code().as_str();
        let message = self.to_string();

        // Add additional details for specific errors
        match self {
            AppError::ValidationError(msg) => {
                ApiError::with_details(
                    message,
                    error_code,
                    json!({ "validation_errors": msg }),
                )
            }
            AppError::Queue(QueueError::InvalidItemKind(kind)) => {
                ApiError::with_details(
                    message,
                    error_code,
                    json!({ "item": kind, "accepted": ["cafe", "filtro"] }),
                )
            }
            _ => ApiError::new(message, error_code),
        }
    }
}

// Implement IntoResponse for AppError
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Application error: {:?}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        let response = ApiResponse::<()>::Error(self.to_api_error());
        (status, Json(response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_errors_map_to_client_statuses() {
        let cases = [
            (QueueError::AlreadyQueued, StatusCode::BAD_REQUEST, "ALREADY_QUEUED"),
            (QueueError::NotQueued, StatusCode::NOT_FOUND, "NOT_QUEUED"),
            (QueueError::NotFirst, StatusCode::FORBIDDEN, "NOT_FIRST"),
            (QueueError::NotFound(7), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                QueueError::InvalidItemKind("espresso".to_string()),
                StatusCode::BAD_REQUEST,
                "INVALID_ITEM_KIND",
            ),
            (QueueError::Forbidden, StatusCode::FORBIDDEN, "FORBIDDEN"),
            (QueueError::UnknownUser, StatusCode::NOT_FOUND, "UNKNOWN_USER"),
        ];

        for (err, status, code) in cases {
            let app_err = AppError::from(err);
            assert_eq!(app_err.status_code(), status);
            assert_eq!(app_err.error_code().as_str(), code);
        }
    }

    #[test]
    fn app_errors_map_to_statuses() {
        let cases = [
            (AppError::ValidationError("email".to_string()), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (AppError::NotFound("user".to_string()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (AppError::Unauthorized("token".to_string()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (AppError::Forbidden("flags".to_string()), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (AppError::Conflict("email".to_string()), StatusCode::CONFLICT, "CONFLICT"),
            (AppError::InternalError("bcrypt".to_string()), StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        ];

        for (err, status, code) in cases {
            assert_eq!(err.status_code(), status);
            assert_eq!(err.error_code().as_str(), code);
        }
    }

    #[test]
    fn storage_failures_are_server_errors() {
        let err = AppError::from(QueueError::StorageUnavailable(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), ErrorCode::DatabaseError);
    }
}
