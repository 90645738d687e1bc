//! Order route handlers for the order owner.

use axum::{
    Json,
    extract::State,
};
use serde::Deserialize;
use tracing::instrument;

use emporium_core::OrderId;

use super::MessageResponse;
use crate::error::Result;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireUser;
use crate::models::{NewOrder, Order};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PaymentQuery {
    pub payment_id: String,
}

/// Place an order. The caller's cart is cleared.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireUser(identity): RequireUser,
    ApiJson(request): ApiJson<NewOrder>,
) -> Result<Json<Order>> {
    Ok(Json(
        state
            .orders()
            .create_order(identity.user_id(), request)
            .await?,
    ))
}

#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireUser(identity): RequireUser,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.orders().list_orders(identity.user_id()).await?))
}

#[instrument(skip(state, identity))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(identity): RequireUser,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<Order>> {
    Ok(Json(state.orders().get_order(id, identity.user_id()).await?))
}

/// Record the gateway payment id and confirm the order.
#[instrument(skip(state, identity, query))]
pub async fn confirm_payment(
    State(state): State<AppState>,
    RequireUser(identity): RequireUser,
    ApiPath(id): ApiPath<OrderId>,
    ApiQuery(query): ApiQuery<PaymentQuery>,
) -> Result<Json<MessageResponse>> {
    state
        .orders()
        .confirm_payment(id, identity.user_id(), &query.payment_id)
        .await?;
    Ok(Json(MessageResponse::new("Payment updated")))
}
