//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                            - Liveness
//! GET    /health/ready                      - Readiness (store round trip)
//!
//! # Auth (rate limited)
//! POST   /api/auth/register                 - Create customer account
//! POST   /api/auth/login                    - Exchange credentials for a token
//! GET    /api/auth/me                       - Current user
//!
//! # Catalog
//! GET    /api/products                      - Filtered listing
//! GET    /api/products/{id}                 - Product detail
//! POST   /api/products                      - Create (admin)
//! PUT    /api/products/{id}                 - Replace (admin)
//! DELETE /api/products/{id}                 - Delete (admin)
//!
//! # Cart & wishlist (requires auth)
//! GET    /api/cart                          - Cart with current product details
//! POST   /api/cart                          - Replace cart contents
//! GET    /api/wishlist                      - Wishlisted products
//! POST   /api/wishlist/{product_id}         - Add (idempotent)
//! DELETE /api/wishlist/{product_id}         - Remove
//!
//! # Reviews
//! GET    /api/reviews/{product_id}          - Reviews, oldest first
//! POST   /api/reviews                       - Add review (requires auth)
//!
//! # Payments & orders (requires auth)
//! POST   /api/payment/create-order?amount   - Gateway payment intent
//! POST   /api/payment/verify                - Verify payment signature
//! POST   /api/orders                        - Place order, clears cart
//! GET    /api/orders                        - Own orders, newest first
//! GET    /api/orders/{id}                   - Own order
//! PATCH  /api/orders/{id}/payment?payment_id - Confirm payment
//!
//! # Admin (requires admin)
//! GET    /api/admin/orders                  - All orders
//! PATCH  /api/admin/orders/{id}?order_status - Set fulfilment label
//! GET    /api/admin/users                   - All users
//! GET    /api/admin/stats                   - Dashboard counters
//! POST   /api/admin/products/{id}/recompute-rating - Rebuild rating aggregate
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod orders;
pub mod payments;
pub mod products;
pub mod reviews;
pub mod wishlist;

use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware as axum_middleware,
    routing::{get, patch, post},
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::{auth_rate_limiter, request_id_middleware};
use crate::state::AppState;

/// Acknowledgement body used by mutating endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    #[must_use]
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}

/// Create the auth routes router.
pub fn auth_routes(rate_limited: bool) -> Router<AppState> {
    let router = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me));

    match auth_rate_limiter().filter(|_| rate_limited) {
        Some(limiter) => router.layer(limiter),
        None => router,
    }
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new().route("/", get(cart::show).post(cart::update))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route(
            "/{product_id}",
            post(wishlist::add).delete(wishlist::remove),
        )
}

/// Create the review routes router.
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(reviews::create))
        .route("/{product_id}", get(reviews::index))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/create-order", post(payments::create_order))
        .route("/verify", post(payments::verify))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/{id}", get(orders::show))
        .route("/{id}/payment", patch(orders::confirm_payment))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(admin::orders))
        .route("/orders/{id}", patch(admin::update_order_status))
        .route("/users", get(admin::users))
        .route("/stats", get(admin::stats))
        .route(
            "/products/{id}/recompute-rating",
            post(admin::recompute_rating),
        )
}

/// Create all `/api` routes.
pub fn api_routes(rate_limited: bool) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes(rate_limited))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/reviews", review_routes())
        .nest("/payment", payment_routes())
        .nest("/orders", order_routes())
        .nest("/admin", admin_routes())
}

/// Build the CORS layer from configured origins.
fn cors_layer(state: &AppState) -> CorsLayer {
    let config = state.config();
    let origins = if config.allows_any_origin() {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}

/// Build the complete application router with its middleware stack.
pub fn app(state: AppState) -> Router {
    let rate_limited = state.config().auth_rate_limit;
    let cors = cors_layer(&state);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api_routes(rate_limited))
        .layer(cors)
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::to_bytes;
    use axum::http::Request as HttpRequest;
    use secrecy::SecretString;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{ApiConfig, JwtConfig, RazorpayConfig, StoreBackend};
    use crate::db::MemoryStore;
    use crate::services::payments::{GatewayOrderRequest, PaymentError, PaymentGateway};

    struct NoGateway;

    #[async_trait]
    impl PaymentGateway for NoGateway {
        async fn create_order(&self, _: &GatewayOrderRequest) -> Result<Value, PaymentError> {
            Err(PaymentError::Gateway("offline".to_string()))
        }

        fn verify_payment_signature(&self, _: &str, _: &str, _: &str) -> Result<(), PaymentError> {
            Err(PaymentError::VerificationFailed)
        }
    }

    fn router(cors_origins: &[&str]) -> Router {
        let config = ApiConfig {
            store_backend: StoreBackend::Memory,
            database_url: None,
            host: [127, 0, 0, 1].into(),
            port: 0,
            jwt: JwtConfig {
                secret: SecretString::from("k3Y!x9Qz#rT2vL8m@Wn4Bp6&Hs1Jd5Fg"),
                expiration_hours: 1,
            },
            razorpay: RazorpayConfig {
                key_id: "rzp_test".to_string(),
                key_secret: SecretString::from("gateway-secret"),
                base_url: "http://127.0.0.1:9".to_string(),
                currency: "INR".to_string(),
            },
            cors_origins: cors_origins.iter().map(ToString::to_string).collect(),
            auth_rate_limit: false,
            sentry_dsn: None,
            sentry_environment: None,
        };
        app(AppState::new(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(NoGateway),
        ))
    }

    #[tokio::test]
    async fn test_health_and_request_id() {
        let response = router(&["*"])
            .oneshot(
                HttpRequest::builder()
                    .uri("/health")
                    .header("x-request-id", "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-request-id"], "req-42");
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin_only() {
        let preflight = |origin: &'static str| {
            HttpRequest::builder()
                .method(Method::OPTIONS)
                .uri("/api/products")
                .header(header::ORIGIN, origin)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap()
        };
        let router = router(&["https://shop.example.in"]);

        let allowed = router
            .clone()
            .oneshot(preflight("https://shop.example.in"))
            .await
            .unwrap();
        assert_eq!(
            allowed.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://shop.example.in"
        );

        let denied = router.oneshot(preflight("https://evil.example")).await.unwrap();
        assert!(
            !denied
                .headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        );
    }

    #[tokio::test]
    async fn test_unknown_product_id_is_not_found() {
        let response = router(&["*"])
            .oneshot(
                HttpRequest::builder()
                    .uri(format!("/api/products/{}", emporium_core::ProductId::generate()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["detail"], "Product not found");
    }

    async fn send(request: HttpRequest<Body>) -> (StatusCode, Value) {
        let response = router(&["*"]).oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_malformed_path_id_is_json_bad_request() {
        let (status, json) = send(
            HttpRequest::builder()
                .uri("/api/products/not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["detail"].is_string());
    }

    #[tokio::test]
    async fn test_malformed_query_is_json_bad_request() {
        let (status, json) = send(
            HttpRequest::builder()
                .uri("/api/products?min_rating=high")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["detail"].is_string());
    }

    #[tokio::test]
    async fn test_malformed_json_body_is_json_bad_request() {
        let (status, json) = send(
            HttpRequest::builder()
                .method(Method::POST)
                .uri("/api/auth/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"email": "a@example.com""#))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["detail"].is_string());

        let (status, json) = send(
            HttpRequest::builder()
                .method(Method::POST)
                .uri("/api/auth/login")
                .body(Body::from("email=a@example.com"))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["detail"].as_str().unwrap().contains("Content-Type"));
    }
}
