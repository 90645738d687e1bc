//! Wishlist route handlers.

use axum::{
    Json,
    extract::State,
};
use tracing::instrument;

use emporium_core::ProductId;

use super::MessageResponse;
use crate::error::Result;
use crate::extract::ApiPath;
use crate::middleware::RequireUser;
use crate::models::WishlistView;
use crate::state::AppState;

#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(identity): RequireUser,
) -> Result<Json<WishlistView>> {
    Ok(Json(state.carts().get_wishlist(identity.user_id()).await?))
}

#[instrument(skip(state, identity))]
pub async fn add(
    State(state): State<AppState>,
    RequireUser(identity): RequireUser,
    ApiPath(product_id): ApiPath<ProductId>,
) -> Result<Json<MessageResponse>> {
    state
        .carts()
        .add_to_wishlist(identity.user_id(), product_id)
        .await?;
    Ok(Json(MessageResponse::new("Added to wishlist")))
}

#[instrument(skip(state, identity))]
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(identity): RequireUser,
    ApiPath(product_id): ApiPath<ProductId>,
) -> Result<Json<MessageResponse>> {
    state
        .carts()
        .remove_from_wishlist(identity.user_id(), product_id)
        .await?;
    Ok(Json(MessageResponse::new("Removed from wishlist")))
}
