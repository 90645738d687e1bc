//! Admin route handlers. Every handler requires an admin token.

use axum::{
    Json,
    extract::State,
};
use serde::Deserialize;
use tracing::instrument;

use emporium_core::{OrderId, OrderStatus, ProductId, RatingSummary};

use super::MessageResponse;
use crate::error::Result;
use crate::extract::{ApiPath, ApiQuery};
use crate::middleware::RequireAdmin;
use crate::models::{AdminStats, Order, User};
use crate::services::CommerceError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OrderStatusQuery {
    pub order_status: String,
}

#[instrument(skip_all)]
pub async fn orders(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.orders().list_all_orders().await?))
}

#[instrument(skip(state, _admin))]
pub async fn update_order_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<OrderId>,
    ApiQuery(query): ApiQuery<OrderStatusQuery>,
) -> Result<Json<MessageResponse>> {
    state
        .orders()
        .admin_set_status(id, OrderStatus::new(query.order_status))
        .await?;
    Ok(Json(MessageResponse::new("Order status updated")))
}

#[instrument(skip_all)]
pub async fn users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<User>>> {
    Ok(Json(state.orders().list_users().await?))
}

#[instrument(skip_all)]
pub async fn stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<AdminStats>> {
    Ok(Json(state.orders().stats().await?))
}

/// Rebuild a product's rating aggregate from its stored reviews.
#[instrument(skip(state, _admin))]
pub async fn recompute_rating(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<RatingSummary>> {
    let summary = state
        .reviews()
        .recompute(id)
        .await?
        .ok_or(CommerceError::ProductNotFound)?;
    Ok(Json(summary))
}
