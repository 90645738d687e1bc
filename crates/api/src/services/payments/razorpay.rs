//! Razorpay REST client.

use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use tracing::{debug, error, instrument};

use super::{GatewayOrderRequest, PaymentError, PaymentGateway};
use crate::config::RazorpayConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    description: Option<String>,
    code: Option<String>,
}

/// Razorpay orders API client.
#[derive(Clone)]
pub struct RazorpayClient {
    client: Client,
    base_url: String,
    key_id: String,
    key_secret: SecretString,
}

impl std::fmt::Debug for RazorpayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayClient")
            .field("base_url", &self.base_url)
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl RazorpayClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Gateway` if the HTTP client cannot be built.
    pub fn new(config: &RazorpayConfig) -> Result<Self, PaymentError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PaymentError::Gateway(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    #[instrument(skip(self), fields(amount = request.amount, currency = %request.currency))]
    async fn create_order(&self, request: &GatewayOrderRequest) -> Result<Value, PaymentError> {
        let response = self
            .client
            .post(format!("{}/v1/orders", self.base_url))
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .json(request)
            .send()
            .await
            .map_err(|e| PaymentError::Gateway(e.to_string()))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| PaymentError::Gateway(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_value::<ErrorEnvelope>(body)
                .ok()
                .and_then(|envelope| envelope.error.description.or(envelope.error.code))
                .unwrap_or_else(|| format!("gateway returned {status}"));
            error!(%status, error = %message, "Razorpay order creation failed");
            return Err(PaymentError::Gateway(message));
        }

        debug!(gateway_order_id = ?body.get("id"), "Razorpay order created");
        Ok(body)
    }

    #[instrument(skip(self, signature))]
    fn verify_payment_signature(
        &self,
        order_ref: &str,
        payment_ref: &str,
        signature: &str,
    ) -> Result<(), PaymentError> {
        let expected = payment_signature(&self.key_secret, order_ref, payment_ref)?;

        if !constant_time_compare(&expected, signature) {
            return Err(PaymentError::Gateway("signature mismatch".to_string()));
        }

        debug!("Razorpay payment signature verified");
        Ok(())
    }
}

/// Hex HMAC-SHA256 of `"{order_ref}|{payment_ref}"` keyed with the gateway secret.
///
/// # Errors
///
/// Returns `PaymentError::Gateway` if the key is rejected by the MAC.
pub fn payment_signature(
    key_secret: &SecretString,
    order_ref: &str,
    payment_ref: &str,
) -> Result<String, PaymentError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key_secret.expose_secret().as_bytes())
        .map_err(|e| PaymentError::Gateway(e.to_string()))?;
    mac.update(format!("{order_ref}|{payment_ref}").as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> RazorpayClient {
        RazorpayClient::new(&RazorpayConfig {
            key_id: "rzp_test_1DP5mmOlF5G5ag".to_string(),
            key_secret: SecretString::from("thisisatestkey"),
            base_url: "http://127.0.0.1:9".to_string(),
            currency: "INR".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_known_signature() {
        let sig = payment_signature(&SecretString::from("key"), "order_1", "pay_1").unwrap();
        assert_eq!(
            sig,
            "65219a93f3f6ab8a5f6962209ec83d04e29cd18b30fffd7e1a2aade3a72c199e"
        );
        assert_ne!(
            sig,
            payment_signature(&SecretString::from("key"), "order_1", "pay_2").unwrap()
        );
    }

    #[test]
    fn test_verify_accepts_matching_signature() {
        let client = client();
        let sig = payment_signature(&client.key_secret, "order_9A33XWu170gUtm", "pay_29QQoUBi66xm2f")
            .unwrap();
        assert!(
            client
                .verify_payment_signature("order_9A33XWu170gUtm", "pay_29QQoUBi66xm2f", &sig)
                .is_ok()
        );
    }

    #[test]
    fn test_verify_rejects_tampered_and_garbage() {
        let client = client();
        let sig = payment_signature(&client.key_secret, "order_1", "pay_1").unwrap();

        assert!(client.verify_payment_signature("order_1", "pay_2", &sig).is_err());
        assert!(client.verify_payment_signature("order_1", "pay_1", "zz").is_err());
        assert!(client.verify_payment_signature("order_1", "pay_1", "").is_err());
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "ab"));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let output = format!("{:?}", client());
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("thisisatestkey"));
    }
}
