// tests/common/mod.rs

#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use store_ratings::{
    config::Config,
    models::user::Role,
    repository::Repositories,
    routes,
    services::user::{NewAccount, create_account},
    state::AppState,
};
use tower::ServiceExt;

pub const PASSWORD: &str = "Abc12345!";

pub struct TestApp {
    pub router: Router,
    pub repos: Repositories,
}

/// Builds the full router over fresh in-memory repositories.
pub fn spawn_app() -> TestApp {
    let config = Config {
        database_url: None,
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        jwt_refresh_secret: "test_refresh_secret".to_string(),
        jwt_refresh_expiration: 3600,
        port: 0,
        rust_log: "error".to_string(),
        admin_name: None,
        admin_email: None,
        admin_password: None,
    };

    let repos = Repositories::in_memory();
    let state = AppState {
        repos: repos.clone(),
        config,
    };

    TestApp {
        router: routes::create_router(state),
        repos,
    }
}

pub fn unique_email() -> String {
    format!("u_{}@example.com", &uuid::Uuid::new_v4().to_string()[..8])
}

impl TestApp {
    /// Sends a request and returns the status with the parsed JSON body
    /// (`Value::Null` for an empty body).
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn signup(&self, email: &str) -> Value {
        let (status, body) = self
            .request(
                "POST",
                "/api/user/signup",
                None,
                Some(json!({
                    "name": "Integration Test Shopper",
                    "email": email,
                    "password": PASSWORD,
                    "address": "42 Test Avenue"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
        body["user"].clone()
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.request(
            "POST",
            "/api/user/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Signs up a shopper and returns (user id, access token).
    pub async fn shopper(&self) -> (String, String) {
        let email = unique_email();
        let user = self.signup(&email).await;
        let (_, session) = self.login(&email, PASSWORD).await;
        (
            user["id"].as_str().unwrap().to_string(),
            session["accessToken"].as_str().unwrap().to_string(),
        )
    }

    /// Creates an account with the given role directly and returns (user id, access token).
    pub async fn account_with_role(&self, role: Role) -> (String, String) {
        let email = unique_email();
        let user = create_account(
            &self.repos,
            NewAccount {
                name: "Privileged Test Account".to_string(),
                email: email.clone(),
                password: PASSWORD.to_string(),
                role,
                address: "1 Admin Plaza".to_string(),
            },
        )
        .await
        .unwrap();
        let (_, session) = self.login(&email, PASSWORD).await;
        (
            user.id.to_string(),
            session["accessToken"].as_str().unwrap().to_string(),
        )
    }

    pub async fn admin_token(&self) -> String {
        self.account_with_role(Role::Admin).await.1
    }

    /// Creates a store as admin and returns its id.
    pub async fn create_store(&self, admin_token: &str, body: Value) -> String {
        let (status, body) = self
            .request("POST", "/api/store", Some(admin_token), Some(body))
            .await;
        assert_eq!(status, StatusCode::CREATED, "store creation failed: {body}");
        body["store"]["id"].as_str().unwrap().to_string()
    }

    pub async fn rate(&self, store_id: &str, user_id: &str, rating: i64) -> (StatusCode, Value) {
        self.request(
            "POST",
            "/api/rating",
            None,
            Some(json!({ "storeId": store_id, "userId": user_id, "rating": rating })),
        )
        .await
    }
}
