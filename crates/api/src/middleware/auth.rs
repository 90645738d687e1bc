//! Authentication extractors.
//!
//! Handlers opt in to authentication by taking [`RequireUser`] or
//! [`RequireAdmin`] as an argument. Both read an `Authorization: Bearer`
//! header and resolve it to a live account.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use emporium_core::Role;

use crate::error::{AppError, set_sentry_user};
use crate::services::auth::{AuthError, AuthService, Identity};
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireUser(identity): RequireUser) -> Json<User> {
///     Json(identity.user)
/// }
/// ```
pub struct RequireUser(pub Identity);

/// Extractor that requires a valid bearer token belonging to an admin.
pub struct RequireAdmin(pub Identity);

/// The token in an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let value = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidToken)
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let identity = state.auth().authenticate(token).await?;
        set_sentry_user(&identity.user.id, Some(identity.user.email.as_str()));
        Ok(Self(identity))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireUser(identity) = RequireUser::from_request_parts(parts, state).await?;
        AuthService::require_role(&identity, Role::Admin)?;
        Ok(Self(identity))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/auth/me");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (parts, ()) = builder.body(()).unwrap_or_default().into_parts();
        parts
    }

    #[test]
    fn test_bearer_token_extraction() {
        let parts = parts_with(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts).ok(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_missing_header_is_missing_token() {
        let parts = parts_with(None);
        assert!(matches!(bearer_token(&parts), Err(AuthError::MissingToken)));
    }

    #[test]
    fn test_wrong_scheme_is_invalid_token() {
        for value in ["Basic dXNlcjpwYXNz", "Bearer ", "abc.def.ghi"] {
            let parts = parts_with(Some(value));
            assert!(matches!(bearer_token(&parts), Err(AuthError::InvalidToken)));
        }
    }
}
