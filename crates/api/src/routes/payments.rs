//! Payment gateway route handlers.

use axum::{
    Json,
    extract::State,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::error::Result;
use crate::extract::{ApiJson, ApiQuery};
use crate::middleware::RequireUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateOrderQuery {
    /// Amount in major currency units.
    pub amount: Decimal,
}

/// Client-reported gateway callback fields.
#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    pub status: &'static str,
}

/// Create a gateway payment intent. The gateway's order object is returned
/// verbatim.
#[instrument(skip(state, _identity))]
pub async fn create_order(
    State(state): State<AppState>,
    RequireUser(_identity): RequireUser,
    ApiQuery(query): ApiQuery<CreateOrderQuery>,
) -> Result<Json<Value>> {
    Ok(Json(
        state.payments().create_payment_intent(query.amount).await?,
    ))
}

#[instrument(skip_all, fields(order_ref = %request.razorpay_order_id))]
pub async fn verify(
    State(state): State<AppState>,
    RequireUser(_identity): RequireUser,
    ApiJson(request): ApiJson<VerifyPaymentRequest>,
) -> Result<Json<VerifyPaymentResponse>> {
    state.payments().verify_signature(
        &request.razorpay_order_id,
        &request.razorpay_payment_id,
        &request.razorpay_signature,
    )?;
    Ok(Json(VerifyPaymentResponse { status: "verified" }))
}
