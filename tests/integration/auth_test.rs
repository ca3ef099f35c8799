//! Integration tests for login and credential resolution.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "sam", "password": PASSWORD })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert!(response.data()["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(response.data()["user"]["role"], "support");
    assert!(response.data()["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new().await;

    let wrong_password = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "sam", "password": "wrong-password" })),
            None,
        )
        .await;
    let unknown_user = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "nobody", "password": "wrong-password" })),
            None,
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_user.body);
}

#[tokio::test]
async fn test_login_rejects_inactive_user() {
    let app = TestApp::new().await;
    app.store.set_user_active(app.support.id, false).await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "sam", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_validates_body() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "  " })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
    assert_eq!(response.violation_fields(), vec!["password", "username"]);
}

#[tokio::test]
async fn test_login_token_works_for_verify() {
    let app = TestApp::new().await;

    let login = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "can", "password": PASSWORD })),
            None,
        )
        .await;
    let token = login.data()["token"].as_str().unwrap().to_string();

    let response = app.request("GET", "/api/auth/verify", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["username"], "can");
    assert_eq!(response.data()["role"], "customer");
    assert_eq!(response.data()["company_id"], app.acme.id);
}

#[tokio::test]
async fn test_missing_or_malformed_credentials() {
    let app = TestApp::new().await;

    let missing = app.request("GET", "/api/tickets", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["error"], "UNAUTHORIZED");

    let garbage = app
        .request("GET", "/api/tickets", None, Some("not-a-jwt"))
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);

    let verify = app.request("GET", "/api/auth/verify", None, None).await;
    assert_eq!(verify.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_of_deactivated_user_is_rejected() {
    let app = TestApp::new().await;
    let token = app.token(&app.customer);

    let before = app.request("GET", "/api/tickets", None, Some(&token)).await;
    assert_eq!(before.status, StatusCode::OK);

    app.store.set_user_active(app.customer.id, false).await;
    let after = app.request("GET", "/api/tickets", None, Some(&token)).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["database"], "connected");

    app.store.set_unavailable(true);
    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.data()["database"], "unreachable");
}
