//! Integration test harness for Emporium.
//!
//! Builds the real router over [`MemoryStore`] and a [`FakeGateway`], so the
//! whole HTTP surface can be driven with `tower::ServiceExt::oneshot`
//! without a database or network access.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p emporium-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `http_auth` - registration, login, token and role checks
//! - `http_commerce` - catalog, cart, wishlist, reviews, orders, admin
//! - `scenarios` - multi-step flows against the services directly

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use emporium_api::config::{ApiConfig, JwtConfig, RazorpayConfig, StoreBackend};
use emporium_api::db::MemoryStore;
use emporium_api::services::auth::create_account;
use emporium_api::services::payments::{
    GatewayOrderRequest, PaymentError, PaymentGateway, payment_signature,
};
use emporium_api::{AppState, app};
use emporium_core::Role;

/// Gateway key shared by [`FakeGateway`] and tests that sign payments.
pub const GATEWAY_SECRET: &str = "test_gateway_secret_value";

/// Password used for every account the harness creates.
pub const PASSWORD: &str = "s3cure-passphrase";

/// Payment gateway double that records requests and checks real signatures.
#[derive(Default)]
pub struct FakeGateway {
    pub requests: Mutex<Vec<GatewayOrderRequest>>,
    pub fail_with: Option<String>,
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(&self, request: &GatewayOrderRequest) -> Result<Value, PaymentError> {
        if let Some(message) = &self.fail_with {
            return Err(PaymentError::Gateway(message.clone()));
        }
        self.requests.lock().unwrap().push(request.clone());
        Ok(json!({
            "id": "order_fake_1",
            "entity": "order",
            "amount": request.amount,
            "currency": request.currency,
            "status": "created",
        }))
    }

    fn verify_payment_signature(
        &self,
        order_ref: &str,
        payment_ref: &str,
        signature: &str,
    ) -> Result<(), PaymentError> {
        let expected = payment_signature(&gateway_secret(), order_ref, payment_ref)?;
        if expected == signature {
            Ok(())
        } else {
            Err(PaymentError::Gateway("signature mismatch".to_string()))
        }
    }
}

#[must_use]
pub fn gateway_secret() -> SecretString {
    SecretString::from(GATEWAY_SECRET)
}

/// Sign a payment the way the gateway would.
#[must_use]
pub fn sign_payment(order_ref: &str, payment_ref: &str) -> String {
    payment_signature(&gateway_secret(), order_ref, payment_ref).unwrap()
}

/// Configuration for the in-memory backend. Rate limiting is off because
/// `oneshot` requests carry no client address.
#[must_use]
pub fn test_config() -> ApiConfig {
    ApiConfig {
        store_backend: StoreBackend::Memory,
        database_url: None,
        host: [127, 0, 0, 1].into(),
        port: 0,
        jwt: JwtConfig {
            secret: SecretString::from("k3Y!x9Qz#rT2vL8m@Wn4Bp6&Hs1Jd5Fg"),
            expiration_hours: 24,
        },
        razorpay: RazorpayConfig {
            key_id: "rzp_test_key".to_string(),
            key_secret: gateway_secret(),
            base_url: "http://127.0.0.1:9".to_string(),
            currency: "INR".to_string(),
        },
        cors_origins: vec!["*".to_string()],
        auth_rate_limit: false,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// A router plus handles on its collaborators.
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub gateway: Arc<FakeGateway>,
    router: Router,
}

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// The `detail` message of an error body.
    #[must_use]
    pub fn detail(&self) -> &str {
        self.body["detail"].as_str().unwrap_or_default()
    }
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        Self::with_gateway(FakeGateway::default())
    }

    #[must_use]
    pub fn with_gateway(gateway: FakeGateway) -> Self {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(gateway);
        let state = AppState::new(test_config(), store.clone(), gateway.clone());
        let router = app(state.clone());
        Self {
            state,
            store,
            gateway,
            router,
        }
    }

    /// Send one request through the full middleware stack.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    /// Register a customer over HTTP and return their token.
    pub async fn register(&self, email: &str, name: &str) -> String {
        let response = self
            .post(
                "/api/auth/register",
                None,
                json!({ "email": email, "password": PASSWORD, "name": name }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["token"].as_str().unwrap().to_string()
    }

    /// Create an admin directly in the store and log in over HTTP.
    pub async fn admin_token(&self) -> String {
        create_account(
            self.store.as_ref(),
            "ops@emporium.test",
            PASSWORD,
            "Ops".to_string(),
            None,
            Role::Admin,
        )
        .await
        .unwrap();

        let response = self
            .post(
                "/api/auth/login",
                None,
                json!({ "email": "ops@emporium.test", "password": PASSWORD }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["token"].as_str().unwrap().to_string()
    }

    /// Create a product as `admin` and return its id.
    pub async fn create_product(&self, admin: &str, name: &str, price: f64) -> String {
        let response = self
            .post(
                "/api/products",
                Some(admin),
                json!({
                    "name": name,
                    "description": format!("{name} description"),
                    "price": price,
                    "category": "kitchen",
                    "stock": 10,
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["id"].as_str().unwrap().to_string()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
