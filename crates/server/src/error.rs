//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`; the body is always JSON:
//!
//! ```json
//! {"success": false, "message": "name is required", "field": "name"}
//! ```

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::ValidationError;
use crate::services::{AuthError, ResourceError, TokenError};

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Registration or login failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// A resource service refused or failed.
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    /// Missing or malformed request field.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but lacks the required role or capability.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(ValidationError::new("body", rejection.body_text()))
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Encoding(e) => Self::Internal(format!("token encoding failed: {e}")),
            other => Self::Unauthorized(other.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

impl AppError {
    fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_)
                | Self::Internal(_)
                | Self::Resource(ResourceError::Repository(_))
                | Self::Auth(
                    AuthError::Repository(_)
                        | AuthError::PasswordHash
                        | AuthError::Token(TokenError::Encoding(_))
                )
        )
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::Validation(_) | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                AuthError::Token(TokenError::Invalid | TokenError::Expired) => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::Token(TokenError::Encoding(_))
                | AuthError::Repository(_)
                | AuthError::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Resource(err) => match err {
                ResourceError::Forbidden(_) => StatusCode::FORBIDDEN,
                ResourceError::Validation(_) => StatusCode::BAD_REQUEST,
                ResourceError::NotFound => StatusCode::NOT_FOUND,
                ResourceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    /// Client-facing message and offending field.
    ///
    /// Internal error details are never exposed.
    fn public_message(&self) -> (String, Option<&'static str>) {
        if self.is_server_error() {
            return ("Internal server error".to_owned(), None);
        }
        match self {
            Self::Validation(v)
            | Self::Auth(AuthError::Validation(v))
            | Self::Resource(ResourceError::Validation(v)) => (v.message.clone(), Some(v.field)),
            Self::Auth(AuthError::InvalidEmail(_)) => {
                ("Invalid email address".to_owned(), Some("email"))
            }
            Self::Auth(AuthError::InvalidCredentials) => ("Invalid credentials".to_owned(), None),
            Self::Auth(AuthError::UserAlreadyExists) | Self::Database(RepositoryError::Conflict(_)) => {
                ("An account with this email already exists".to_owned(), None)
            }
            Self::Auth(AuthError::Token(_)) => ("Invalid or expired token".to_owned(), None),
            Self::Resource(ResourceError::Forbidden(action)) => {
                (format!("You do not have permission to {action}"), None)
            }
            Self::Resource(ResourceError::NotFound) | Self::Database(RepositoryError::NotFound) => {
                ("Not found".to_owned(), None)
            }
            Self::NotFound(msg) | Self::Unauthorized(msg) | Self::Forbidden(msg) => {
                (msg.clone(), None)
            }
            _ => ("Internal server error".to_owned(), None),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let (message, field) = self.public_message();

        (
            status,
            Json(ErrorBody {
                success: false,
                message,
                field,
            }),
        )
            .into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Called by the auth middleware so errors are associated with users.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use taskie_core::Action;

    use super::*;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_carries_field() {
        let (status, body) = render(ValidationError::required("name").into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["field"], "name");
        assert_eq!(body["message"], "name is required");
    }

    #[tokio::test]
    async fn test_forbidden_names_action() {
        let (status, body) = render(ResourceError::Forbidden(Action::CreateTask).into()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "You do not have permission to createTask");
        assert!(body.get("field").is_none());
    }

    #[tokio::test]
    async fn test_conflict_and_credentials() {
        let (status, _) = render(AuthError::UserAlreadyExists.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        let (status, body) = render(AuthError::InvalidCredentials.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let (status, body) = render(
            RepositoryError::DataCorruption("users.email has garbage".to_owned()).into(),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");

        let (status, body) = render(
            ResourceError::Repository(RepositoryError::DataCorruption("x".to_owned())).into(),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
    }

    #[tokio::test]
    async fn test_not_found() {
        let (status, _) = render(ResourceError::NotFound.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
