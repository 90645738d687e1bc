//! Cart route handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use emporium_core::CartLine;

use super::MessageResponse;
use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::RequireUser;
use crate::models::CartView;
use crate::state::AppState;

/// Replacement cart contents.
#[derive(Debug, Deserialize)]
pub struct CartUpdate {
    pub items: Vec<CartLine>,
}

/// The caller's cart joined with current product details.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(identity): RequireUser,
) -> Result<Json<CartView>> {
    Ok(Json(state.carts().get_cart(identity.user_id()).await?))
}

/// Replace the caller's cart.
#[instrument(skip_all, fields(lines = body.items.len()))]
pub async fn update(
    State(state): State<AppState>,
    RequireUser(identity): RequireUser,
    ApiJson(body): ApiJson<CartUpdate>,
) -> Result<Json<MessageResponse>> {
    state
        .carts()
        .set_cart(identity.user_id(), &body.items)
        .await?;
    Ok(Json(MessageResponse::new("Cart updated")))
}
