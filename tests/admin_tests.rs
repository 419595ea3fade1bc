// tests/admin_tests.rs

mod common;

use axum::http::StatusCode;
use common::{PASSWORD, spawn_app, unique_email};
use serde_json::json;
use store_ratings::models::user::Role;

#[tokio::test]
async fn admin_routes_reject_non_admins() {
    let app = spawn_app();
    let (_, shopper) = app.shopper().await;
    let (_, owner) = app.account_with_role(Role::StoreOwner).await;

    for uri in ["/api/admin/dashboard", "/api/admin/users", "/api/admin/stores"] {
        let (status, _) = app.request("GET", uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");

        for token in [&shopper, &owner] {
            let (status, _) = app.request("GET", uri, Some(token), None).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        }
    }
}

#[tokio::test]
async fn dashboard_counts_everything() {
    let app = spawn_app();
    let admin = app.admin_token().await;
    let (user_id, _) = app.shopper().await;
    let store_id = app
        .create_store(&admin, json!({ "name": "Counted Shop", "address": "1 Stat St" }))
        .await;
    app.rate(&store_id, &user_id, 4).await;

    let (status, body) = app
        .request("GET", "/api/admin/dashboard", Some(&admin), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Admin Dashboard Stats");
    assert_eq!(body["stats"]["totalUsers"], 2);
    assert_eq!(body["stats"]["totalStores"], 1);
    assert_eq!(body["stats"]["totalRatings"], 1);
}

#[tokio::test]
async fn user_list_attaches_owned_store() {
    let app = spawn_app();
    let admin = app.admin_token().await;
    let (owner_id, _) = app.account_with_role(Role::StoreOwner).await;
    let (shopper_a, _) = app.shopper().await;
    let (shopper_b, _) = app.shopper().await;
    let store_id = app
        .create_store(
            &admin,
            json!({ "name": "Owner Shop", "address": "2 Stat St", "ownerId": owner_id }),
        )
        .await;
    app.rate(&store_id, &shopper_a, 5).await;
    app.rate(&store_id, &shopper_b, 4).await;
    app.rate(&store_id, &owner_id, 5).await;

    let (status, body) = app
        .request("GET", "/api/admin/users?role=STORE_OWNER", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], owner_id.as_str());
    assert_eq!(rows[0]["store"]["name"], "Owner Shop");
    assert_eq!(rows[0]["store"]["averageRating"], 4.67);

    let (_, body) = app
        .request("GET", "/api/admin/users?role=USER", Some(&admin), None)
        .await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.get("store").is_none()));
    assert!(rows.iter().all(|r| r.get("password").is_none()));
}

#[tokio::test]
async fn user_list_rejects_unknown_role_filter() {
    let app = spawn_app();
    let admin = app.admin_token().await;

    let (status, _) = app
        .request("GET", "/api/admin/users?role=SUPERUSER", Some(&admin), None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn user_list_ignores_blank_filters() {
    let app = spawn_app();
    let admin = app.admin_token().await;
    app.shopper().await;
    app.account_with_role(Role::StoreOwner).await;

    let (status, body) = app
        .request(
            "GET",
            "/api/admin/users?name=&email=&address=&role=",
            Some(&admin),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn store_list_shows_owner_and_rounded_average() {
    let app = spawn_app();
    let admin = app.admin_token().await;
    let store_id = app
        .create_store(&admin, json!({ "name": "Thirds Shop", "address": "3 Stat St" }))
        .await;
    for value in [1, 1, 2] {
        let (user_id, _) = app.shopper().await;
        app.rate(&store_id, &user_id, value).await;
    }

    let (status, body) = app
        .request("GET", "/api/admin/stores?name=thirds", Some(&admin), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["averageRating"], 1.33);
    assert!(rows[0]["owner"].is_null());
}

#[tokio::test]
async fn admin_creates_users_with_any_role() {
    let app = spawn_app();
    let admin = app.admin_token().await;
    let email = unique_email();

    let (status, body) = app
        .request(
            "POST",
            "/api/admin/create-user",
            Some(&admin),
            Some(json!({
                "name": "Newly Appointed Store Owner",
                "email": email,
                "password": PASSWORD,
                "role": "STORE_OWNER",
                "address": "4 Stat St"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["user"]["role"], "STORE_OWNER");

    assert_eq!(app.login(&email, PASSWORD).await.0, StatusCode::OK);
}

#[tokio::test]
async fn admin_create_user_validates_role_and_password() {
    let app = spawn_app();
    let admin = app.admin_token().await;

    let mut cases = vec![("MANAGER", PASSWORD)];
    // too short, too long, no uppercase, no special character
    for weak in ["Abc123!", "Abcdefghijklmn1!x", "abc12345!", "Abc123456"] {
        cases.push(("USER", weak));
    }

    for (role, password) in cases {
        let (status, _) = app
            .request(
                "POST",
                "/api/admin/create-user",
                Some(&admin),
                Some(json!({
                    "name": "Rejected Account Full Name",
                    "email": unique_email(),
                    "password": password,
                    "role": role,
                    "address": "5 Stat St"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{role} / {password}");
    }
}
