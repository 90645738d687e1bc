//! Account registration, login and the current-user lookup.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::RequireUser;
use crate::models::User;
use crate::services::auth::{AuthSession, LoginRequest, RegisterRequest};
use crate::state::AppState;

/// Register a customer account.
#[instrument(skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<Json<AuthSession>> {
    Ok(Json(state.auth().register(request).await?))
}

/// Login with email and password.
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<AuthSession>> {
    Ok(Json(state.auth().login(request).await?))
}

/// The authenticated user.
pub async fn me(RequireUser(identity): RequireUser) -> Json<User> {
    Json(identity.user)
}
