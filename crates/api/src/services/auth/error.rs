//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] emporium_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Token subject no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// No bearer token on the request.
    #[error("missing bearer token")]
    MissingToken,

    /// Token signature was valid but its expiry has passed.
    #[error("token expired")]
    TokenExpired,

    /// Token is malformed, badly signed, or names no valid subject.
    #[error("invalid token")]
    InvalidToken,

    /// Authenticated, but the role is insufficient.
    #[error("requires role {0}")]
    Forbidden(emporium_core::Role),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Token could not be signed.
    #[error("token signing error: {0}")]
    TokenIssue(String),
}
