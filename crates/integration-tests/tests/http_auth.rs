//! HTTP tests for registration, login and bearer token handling.

use axum::http::StatusCode;
use serde_json::json;

use emporium_api::services::auth::Claims;
use emporium_core::{Email, Role, UserId};
use emporium_integration_tests::{PASSWORD, TestApp};

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();

    let live = app.get("/health", None).await;
    assert_eq!(live.status, StatusCode::OK);

    let ready = app.get("/health/ready", None).await;
    assert_eq!(ready.status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_returns_token_and_public_user() {
    let app = TestApp::new();

    let response = app
        .post(
            "/api/auth/register",
            None,
            json!({
                "email": "asha@example.in",
                "password": PASSWORD,
                "name": "Asha",
                "phone": "+91 98765 43210",
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(response.body["user"]["email"], "asha@example.in");
    assert_eq!(response.body["user"]["role"], "customer");
    assert_eq!(response.body["user"]["phone"], "+91 98765 43210");
    assert!(response.body["user"].get("password").is_none());
    assert!(response.body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let app = TestApp::new();
    app.register("dup@example.in", "First").await;

    let response = app
        .post(
            "/api/auth/register",
            None,
            json!({ "email": "dup@example.in", "password": PASSWORD, "name": "Second" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.detail(), "Email already registered");
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let app = TestApp::new();

    let bad_email = app
        .post(
            "/api/auth/register",
            None,
            json!({ "email": "not-an-email", "password": PASSWORD, "name": "X" }),
        )
        .await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);

    let short_password = app
        .post(
            "/api/auth/register",
            None,
            json!({ "email": "short@example.in", "password": "abc", "name": "X" }),
        )
        .await;
    assert_eq!(short_password.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_and_me() {
    let app = TestApp::new();
    app.register("meera@example.in", "Meera").await;

    let login = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "meera@example.in", "password": PASSWORD }),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    let token = login.body["token"].as_str().unwrap().to_string();

    let me = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["name"], "Meera");
}

#[tokio::test]
async fn test_login_failures_do_not_reveal_which_part_was_wrong() {
    let app = TestApp::new();
    app.register("ravi@example.in", "Ravi").await;

    let wrong_password = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "ravi@example.in", "password": "wrong-password" }),
        )
        .await;
    let unknown_email = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "nobody@example.in", "password": PASSWORD }),
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.detail(), "Invalid credentials");
    assert_eq!(unknown_email.detail(), "Invalid credentials");
}

#[tokio::test]
async fn test_token_failures_have_distinct_messages() {
    let app = TestApp::new();

    let missing = app.get("/api/auth/me", None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.detail(), "Not authenticated");

    let garbage = app.get("/api/auth/me", Some("not.a.jwt")).await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage.detail(), "Invalid token");

    let now = 1_700_000_000;
    let expired = app
        .state
        .tokens()
        .sign(&Claims {
            sub: UserId::generate(),
            email: "old@example.in".to_string(),
            role: Role::Customer,
            iat: now - 7200,
            exp: now - 3600,
        })
        .unwrap();
    let response = app.get("/api/auth/me", Some(&expired)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.detail(), "Token expired");

    let email = Email::parse("ghost@example.in").unwrap();
    let ghost = app
        .state
        .tokens()
        .issue(UserId::generate(), &email, Role::Customer)
        .unwrap();
    let response = app.get("/api/auth/me", Some(&ghost)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.detail(), "User not found");
}

#[tokio::test]
async fn test_admin_routes_require_admin_role() {
    let app = TestApp::new();
    let customer = app.register("shopper@example.in", "Shopper").await;

    let response = app.get("/api/admin/stats", Some(&customer)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.detail(), "Admin access required");

    let response = app
        .post(
            "/api/products",
            Some(&customer),
            json!({ "name": "X", "description": "Y", "price": 1.0, "category": "z" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let anonymous = app.get("/api/admin/users", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let admin = app.admin_token().await;
    let response = app.get("/api/admin/stats", Some(&admin)).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_token_role_claim_is_not_trusted() {
    let app = TestApp::new();
    let token = app.register("sneaky@example.in", "Sneaky").await;
    let claims = app.state.tokens().verify(&token).unwrap();

    // Re-sign the same subject claiming admin; the stored role still wins.
    let forged = app
        .state
        .tokens()
        .sign(&Claims {
            role: Role::Admin,
            ..claims
        })
        .unwrap();

    let response = app.get("/api/admin/users", Some(&forged)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = TestApp::new();
    let response = app.get("/health", None).await;
    assert_eq!(response.body, "ok");
    let request_id = response.headers.get("x-request-id").unwrap();
    assert!(!request_id.is_empty());
}
