//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-class errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`. Every domain error maps to a stable `snake_case`
//! code in the JSON body so the frontend never has to parse prose.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AchievementError, AuthError, TaskError, UserError};

/// Application-level error type for the FitHero API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Task assignment/completion failed.
    #[error("task error: {0}")]
    Task(#[from] TaskError),

    /// Achievement unlock failed.
    #[error("achievement error: {0}")]
    Achievement(#[from] AchievementError),

    /// User account operation failed.
    #[error("user error: {0}")]
    User(#[from] UserError),

    /// Sign-in failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    /// User is not authenticated.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Requested route/feature is not available.
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error body: a stable code plus a human-readable message.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl AppError {
    /// Stable machine-readable code for this error.
    #[must_use]
    fn code(&self) -> &'static str {
        match self {
            Self::Task(e) => match e {
                TaskError::UserNotFound => "user_not_found",
                TaskError::TaskNotFound => "task_not_found",
                TaskError::AssignmentNotFound => "daily_task_not_found",
                TaskError::AccessDenied => "access_denied",
                TaskError::AlreadyCompleted => "task_already_completed",
                TaskError::NoTasksAvailable => "no_tasks_available",
                TaskError::AwardFailed(_) => "points_award_failed",
                TaskError::Repository(_) => "internal_error",
            },
            Self::Achievement(e) => match e {
                AchievementError::UserNotFound => "user_not_found",
                AchievementError::AchievementNotFound => "achievement_not_found",
                AchievementError::AlreadyUnlocked => "achievement_already_unlocked",
                AchievementError::InsufficientFunds { .. } => "insufficient_points",
                AchievementError::UnlockFailed(_) => "unlock_failed",
                AchievementError::Repository(_) => "internal_error",
            },
            Self::User(e) => match e {
                UserError::NotFound => "user_not_found",
                UserError::Duplicate(_) => "duplicate_field",
                UserError::InvalidEmail(_) => "invalid_email",
                UserError::InvalidPoints(_) => "invalid_points",
                UserError::Repository(_) => "internal_error",
            },
            Self::Auth(e) => match e {
                AuthError::MissingCode => "missing_code",
                AuthError::InvalidState => "invalid_state",
                AuthError::Denied(_) => "authorization_denied",
                AuthError::TokenExchange(_) | AuthError::Userinfo(_) | AuthError::Http(_) => {
                    "oauth_upstream_error"
                }
                AuthError::InvalidEmail(_) => "invalid_email",
                AuthError::Repository(_) => "internal_error",
            },
            Self::Database(_) | Self::Internal(_) => "internal_error",
            Self::Unauthorized(_) => "authentication_required",
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
        }
    }

    /// HTTP status for this error.
    #[must_use]
    fn status(&self) -> StatusCode {
        match self {
            Self::Task(e) => match e {
                TaskError::UserNotFound
                | TaskError::TaskNotFound
                | TaskError::AssignmentNotFound => StatusCode::NOT_FOUND,
                TaskError::AccessDenied => StatusCode::FORBIDDEN,
                TaskError::AlreadyCompleted => StatusCode::CONFLICT,
                TaskError::NoTasksAvailable => StatusCode::BAD_REQUEST,
                TaskError::AwardFailed(_) | TaskError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Achievement(e) => match e {
                AchievementError::UserNotFound | AchievementError::AchievementNotFound => {
                    StatusCode::NOT_FOUND
                }
                AchievementError::AlreadyUnlocked => StatusCode::CONFLICT,
                AchievementError::InsufficientFunds { .. } => StatusCode::BAD_REQUEST,
                AchievementError::UnlockFailed(_) | AchievementError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::User(e) => match e {
                UserError::NotFound => StatusCode::NOT_FOUND,
                UserError::Duplicate(_) => StatusCode::CONFLICT,
                UserError::InvalidEmail(_) | UserError::InvalidPoints(_) => {
                    StatusCode::BAD_REQUEST
                }
                UserError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Auth(e) => match e {
                AuthError::MissingCode | AuthError::InvalidState | AuthError::Denied(_) => {
                    StatusCode::BAD_REQUEST
                }
                AuthError::TokenExchange(_) | AuthError::Userinfo(_) | AuthError::Http(_) => {
                    StatusCode::BAD_GATEWAY
                }
                AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server-class errors to Sentry; compensation failures in
        // particular must be loud, not swallowed
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            error: self.code(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_task_error_statuses() {
        assert_eq!(
            status_of(AppError::Task(TaskError::AssignmentNotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Task(TaskError::AccessDenied)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AppError::Task(TaskError::AlreadyCompleted)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Task(TaskError::NoTasksAvailable)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_achievement_error_statuses() {
        use fithero_core::Points;

        assert_eq!(
            status_of(AppError::Achievement(AchievementError::AlreadyUnlocked)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Achievement(
                AchievementError::InsufficientFunds {
                    required: Points::ZERO,
                    available: Points::ZERO,
                }
            )),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Achievement(AchievementError::AchievementNotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(
            AppError::Task(TaskError::AlreadyCompleted).code(),
            "task_already_completed"
        );
        assert_eq!(
            AppError::Achievement(AchievementError::AlreadyUnlocked).code(),
            "achievement_already_unlocked"
        );
        assert_eq!(
            AppError::Unauthorized("no session".to_owned()).code(),
            "authentication_required"
        );
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let response =
            AppError::Internal("connection string leaked".to_owned()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
