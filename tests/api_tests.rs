// tests/api_tests.rs

mod common;

use axum::http::StatusCode;
use common::{PASSWORD, spawn_app, unique_email};
use serde_json::json;

#[tokio::test]
async fn health_check_404() {
    let app = spawn_app();

    let (status, _) = app
        .request("GET", "/random_path_that_does_not_exist", None, None)
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_reports_ok() {
    let app = spawn_app();

    let (status, body) = app.request("GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn signup_works() {
    let app = spawn_app();
    let email = unique_email();

    let (status, body) = app
        .request(
            "POST",
            "/api/user/signup",
            None,
            Some(json!({
                "name": "Alexandra Integration Tester",
                "email": email,
                "password": PASSWORD,
                "address": "1 Main St"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["user"]["email"], email.as_str());
    assert_eq!(body["user"]["role"], "USER");
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn signup_ignores_requested_role() {
    let app = spawn_app();

    let (status, body) = app
        .request(
            "POST",
            "/api/user/signup",
            None,
            Some(json!({
                "name": "Would Be Administrator Person",
                "email": unique_email(),
                "password": PASSWORD,
                "address": "2 Main St",
                "role": "ADMIN"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "USER");
}

#[tokio::test]
async fn signup_rejects_invalid_input() {
    let app = spawn_app();

    let cases = [
        json!({ "name": "Too Short", "email": unique_email(), "password": PASSWORD, "address": "x" }),
        json!({ "name": "Perfectly Acceptable Name", "email": "not-an-email", "password": PASSWORD, "address": "x" }),
        json!({ "name": "Perfectly Acceptable Name", "email": unique_email(), "password": "abc12345!", "address": "x" }),
        json!({ "name": "Perfectly Acceptable Name", "email": unique_email(), "password": "Abc123456", "address": "x" }),
        json!({ "name": "Perfectly Acceptable Name", "email": unique_email(), "password": PASSWORD, "address": "x".repeat(401) }),
    ];

    for case in cases {
        let (status, body) = app
            .request("POST", "/api/user/signup", None, Some(case.clone()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {case}");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn signup_duplicate_email_conflicts() {
    let app = spawn_app();
    let email = unique_email();
    app.signup(&email).await;

    let (status, body) = app
        .request(
            "POST",
            "/api/user/signup",
            None,
            Some(json!({
                "name": "Second Account Same Email",
                "email": email,
                "password": PASSWORD,
                "address": "3 Main St"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "User already exists");
}

#[tokio::test]
async fn login_returns_tokens_and_user() {
    let app = spawn_app();
    let email = unique_email();
    app.signup(&email).await;

    let (status, body) = app.login(&email, PASSWORD).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["accessToken"].is_string());
    assert!(body["refreshToken"].is_string());
    assert_eq!(body["user"]["email"], email.as_str());
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn login_failures_look_the_same() {
    let app = spawn_app();
    let email = unique_email();
    app.signup(&email).await;

    let wrong_password = app.login(&email, "Wrong123!").await;
    let unknown_email = app.login(&unique_email(), PASSWORD).await;

    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.1, unknown_email.1);
}

#[tokio::test]
async fn refresh_token_issues_access_token() {
    let app = spawn_app();
    let email = unique_email();
    app.signup(&email).await;
    let (_, session) = app.login(&email, PASSWORD).await;

    let (status, body) = app
        .request(
            "POST",
            "/api/user/refresh",
            None,
            Some(json!({ "refreshToken": session["refreshToken"] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let fresh = body["accessToken"].as_str().unwrap();
    let (status, _) = app.request("GET", "/api/store", Some(fresh), None).await;
    assert_eq!(status, StatusCode::OK);

    // refresh tokens do not open protected routes
    let refresh = session["refreshToken"].as_str().unwrap();
    let (status, _) = app.request("GET", "/api/store", Some(refresh), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_requires_token() {
    let app = spawn_app();
    let (id, token) = app.shopper().await;
    let uri = format!("/api/user/{}", id);

    let (status, _) = app.request("GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.request("GET", &uri, Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.request("GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());
}

#[tokio::test]
async fn profile_lookup_distinguishes_bad_and_missing_ids() {
    let app = spawn_app();
    let (_, token) = app.shopper().await;

    let (status, _) = app
        .request("GET", "/api/user/not-a-uuid", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing = format!("/api/user/{}", uuid::Uuid::new_v4());
    let (status, _) = app.request("GET", &missing, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_update_changes_only_given_fields() {
    let app = spawn_app();
    let (id, token) = app.shopper().await;
    let uri = format!("/api/user/{}", id);

    let (status, body) = app
        .request(
            "PUT",
            &uri,
            Some(&token),
            Some(json!({ "address": "99 New Road", "name": "" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile updated successfully");
    assert_eq!(body["user"]["address"], "99 New Road");
    assert_eq!(body["user"]["name"], "Integration Test Shopper");
}

#[tokio::test]
async fn password_update_flow() {
    let app = spawn_app();
    let email = unique_email();
    let user = app.signup(&email).await;
    let (_, session) = app.login(&email, PASSWORD).await;
    let token = session["accessToken"].as_str().unwrap();
    let uri = format!("/api/user/{}/password", user["id"].as_str().unwrap());

    let (status, _) = app
        .request(
            "PUT",
            &uri,
            Some(token),
            Some(json!({ "oldPassword": "Wrong123!", "newPassword": "Xyz98765@" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request(
            "PUT",
            &uri,
            Some(token),
            Some(json!({ "oldPassword": PASSWORD, "newPassword": "weakpass" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request(
            "PUT",
            &uri,
            Some(token),
            Some(json!({ "oldPassword": PASSWORD, "newPassword": "Xyz98765@" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password updated successfully");

    assert_eq!(app.login(&email, PASSWORD).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(app.login(&email, "Xyz98765@").await.0, StatusCode::OK);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = spawn_app();

    let (status, body) = app
        .request(
            "POST",
            "/api/user/login",
            None,
            Some(json!({ "email": "missing-password@example.com" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
