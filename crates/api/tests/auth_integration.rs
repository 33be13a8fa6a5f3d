//! Integration tests for login and the current-user endpoint.

mod common;

use axum::http::{Method, StatusCode};
use common::{json_request, parse_response_body, TestApp, TEST_PASSWORD};
use domain::models::{CompanyStatus, UserRole};
use serde_json::json;

#[tokio::test]
async fn test_login_success_returns_token_and_user() {
    let app = TestApp::new();
    let company = app.seed_company(None).await;
    let user = app.seed_user(UserRole::Admin, Some(company.id)).await;

    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": user.email, "password": TEST_PASSWORD })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);
    assert_eq!(body["user"]["email"], user.email);
    assert_eq!(body["user"]["role"], "admin");
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["user"]["last_login_at"].is_string());

    let token = body["access_token"].as_str().unwrap().to_string();
    let response = app
        .send(json_request(Method::GET, "/api/v1/auth/me", Some(&token), None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let me = parse_response_body(response).await;
    assert_eq!(me["id"], user.id.to_string());
    assert_eq!(me["company_id"], company.id.to_string());
}

#[tokio::test]
async fn test_login_email_is_case_insensitive() {
    let app = TestApp::new();
    let user = app.seed_user(UserRole::Master, None).await;

    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": user.email.to_uppercase(), "password": TEST_PASSWORD })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new();
    let user = app.seed_user(UserRole::Master, None).await;

    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": user.email, "password": "not-the-password" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "unauthorized");
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_login_unknown_email_looks_like_wrong_password() {
    let app = TestApp::new();

    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": TEST_PASSWORD })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_login_rejected_for_suspended_company() {
    let app = TestApp::new();
    let company = app
        .seed_company_with_status(None, CompanyStatus::Suspended)
        .await;
    let user = app.seed_user(UserRole::User, Some(company.id)).await;

    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": user.email, "password": TEST_PASSWORD })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_login_rate_limited() {
    let app = TestApp::with_login_limit(2);
    let user = app.seed_user(UserRole::Master, None).await;

    let attempt = || {
        json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": user.email, "password": "wrong-password" })),
        )
    };

    assert_eq!(app.send(attempt()).await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.send(attempt()).await.status(), StatusCode::UNAUTHORIZED);

    let response = app.send(attempt()).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "rate_limited");
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = TestApp::new();

    let response = app
        .send(json_request(Method::GET, "/api/v1/auth/me", None, None))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .send(json_request(
            Method::GET,
            "/api/v1/auth/me",
            Some("not-a-jwt"),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_login_payload() {
    let app = TestApp::new();

    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "not-an-email", "password": "x" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
