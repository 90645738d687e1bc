//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Error bodies are JSON of the form `{"detail": "..."}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use emporium_core::Role;

use crate::db::RepositoryError;
use crate::services::CommerceError;
use crate::services::auth::AuthError;
use crate::services::payments::PaymentError;

const INTERNAL: &str = "Internal server error";

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Catalog, cart, review or order rule failed.
    #[error("Commerce error: {0}")]
    Commerce(#[from] CommerceError),

    /// Payment gateway operation failed.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Malformed path, query string or JSON body.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Status code and client-facing message.
    ///
    /// Internal details are hidden, except the payment gateway's own message,
    /// which clients need to see.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string()),
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_) => {
                    (StatusCode::BAD_REQUEST, "Invalid email address".to_string())
                }
                AuthError::WeakPassword(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                AuthError::UserAlreadyExists => {
                    (StatusCode::CONFLICT, "Email already registered".to_string())
                }
                AuthError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
                }
                AuthError::UserNotFound => (StatusCode::UNAUTHORIZED, "User not found".to_string()),
                AuthError::MissingToken => {
                    (StatusCode::UNAUTHORIZED, "Not authenticated".to_string())
                }
                AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired".to_string()),
                AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token".to_string()),
                AuthError::Forbidden(Role::Admin) => {
                    (StatusCode::FORBIDDEN, "Admin access required".to_string())
                }
                AuthError::Forbidden(_) => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
                AuthError::Repository(_) | AuthError::PasswordHash | AuthError::TokenIssue(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string())
                }
            },
            Self::Commerce(err) => match err {
                CommerceError::ProductNotFound | CommerceError::OrderNotFound => {
                    (StatusCode::NOT_FOUND, err.to_string())
                }
                CommerceError::InvalidCart(_) | CommerceError::InvalidProduct(_) => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                CommerceError::Repository(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string())
                }
            },
            Self::Payment(err) => match err {
                PaymentError::Gateway(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
                PaymentError::InvalidAmount(_) | PaymentError::VerificationFailed => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
            },
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "detail": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the authenticated caller.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: impl Into<AppError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("missing field `rating`".to_string());
        assert_eq!(err.to_string(), "Bad request: missing field `rating`");
    }

    #[test]
    fn test_bad_request_keeps_message() {
        let err = AppError::BadRequest("missing field `rating`".to_string());
        assert_eq!(
            err.status_and_message(),
            (StatusCode::BAD_REQUEST, "missing field `rating`".to_string())
        );
    }

    #[test]
    fn test_auth_status_codes() {
        assert_eq!(status_of(AuthError::TokenExpired), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::InvalidToken), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::UserNotFound), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::MissingToken), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::UserAlreadyExists), StatusCode::CONFLICT);
        assert_eq!(
            status_of(AuthError::Forbidden(Role::Admin)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AuthError::WeakPassword("too short".to_string())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_commerce_and_payment_status_codes() {
        assert_eq!(status_of(CommerceError::OrderNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(CommerceError::ProductNotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(PaymentError::VerificationFailed),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(PaymentError::Gateway("bad key".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(RepositoryError::Conflict("email".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages_hide_internals_but_keep_gateway_text() {
        let (_, message) = AppError::from(RepositoryError::DataCorruption("secret detail".into()))
            .status_and_message();
        assert_eq!(message, INTERNAL);

        let (_, message) =
            AppError::from(PaymentError::Gateway("The api key provided is invalid".into()))
                .status_and_message();
        assert_eq!(message, "The api key provided is invalid");

        let (_, message) = AppError::from(AuthError::TokenExpired).status_and_message();
        assert_eq!(message, "Token expired");
    }
}
