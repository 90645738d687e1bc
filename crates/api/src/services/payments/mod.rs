//! Payment gateway bridge.
//!
//! Two stateless operations against the gateway: create a payment intent,
//! and verify the signature the gateway hands the client after payment.
//! Neither touches stored orders. Recording a payment on an order is a
//! separate call (see [`OrderCoordinator::confirm_payment`](crate::services::orders::OrderCoordinator::confirm_payment))
//! and is never chained to verification here.

mod error;
mod razorpay;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use tracing::{instrument, warn};

use emporium_core::to_minor_units;

pub use error::PaymentError;
pub use razorpay::{RazorpayClient, payment_signature};

/// Body of a gateway create-order call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayOrderRequest {
    /// Minor units (paise for INR).
    pub amount: i64,
    pub currency: String,
    /// Always 1: capture automatically on authorization.
    pub payment_capture: u8,
}

/// A payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a gateway-side order and return its JSON as-is.
    async fn create_order(&self, request: &GatewayOrderRequest) -> Result<Value, PaymentError>;

    /// Check `signature` against `order_ref|payment_ref` using the gateway key.
    fn verify_payment_signature(
        &self,
        order_ref: &str,
        payment_ref: &str,
        signature: &str,
    ) -> Result<(), PaymentError>;
}

/// Payment operations exposed to handlers.
pub struct PaymentBridge<'a> {
    gateway: &'a dyn PaymentGateway,
    currency: &'a str,
}

impl<'a> PaymentBridge<'a> {
    #[must_use]
    pub fn new(gateway: &'a dyn PaymentGateway, currency: &'a str) -> Self {
        Self { gateway, currency }
    }

    /// Ask the gateway for a payment intent of `amount` major units.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidAmount` if the amount overflows minor
    /// units, or `PaymentError::Gateway` with the gateway's message.
    #[instrument(skip(self))]
    pub async fn create_payment_intent(&self, amount: Decimal) -> Result<Value, PaymentError> {
        let request = GatewayOrderRequest {
            amount: to_minor_units(amount)?,
            currency: self.currency.to_owned(),
            payment_capture: 1,
        };
        self.gateway.create_order(&request).await
    }

    /// Verify a client-reported payment.
    ///
    /// # Errors
    ///
    /// Every failure is reported as `PaymentError::VerificationFailed`.
    #[instrument(skip(self, signature))]
    pub fn verify_signature(
        &self,
        order_ref: &str,
        payment_ref: &str,
        signature: &str,
    ) -> Result<(), PaymentError> {
        self.gateway
            .verify_payment_signature(order_ref, payment_ref, signature)
            .map_err(|e| {
                warn!(error = %e, "Payment signature rejected");
                PaymentError::VerificationFailed
            })
    }
}
