// src/handlers/admin.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::{
    error::AppError,
    models::{
        store::StoreFilter,
        user::{AdminCreateUserRequest, UserFilter},
    },
    repository::Repositories,
    services::admin as service,
    utils::extract::{AppJson, AppQuery},
};

/// Totals of users, stores and ratings.
/// Admin only.
pub async fn dashboard(State(repos): State<Repositories>) -> Result<impl IntoResponse, AppError> {
    let stats = service::dashboard_stats(&repos).await?;
    Ok(Json(
        json!({ "message": "Admin Dashboard Stats", "stats": stats }),
    ))
}

/// Lists users filtered by name, email, address and role.
/// Admin only.
pub async fn list_users(
    State(repos): State<Repositories>,
    AppQuery(filter): AppQuery<UserFilter>,
) -> Result<impl IntoResponse, AppError> {
    let users = service::list_users_with_filters(&repos, &filter).await?;
    Ok(Json(users))
}

/// Lists stores with owner and average rating.
/// Admin only.
pub async fn list_stores(
    State(repos): State<Repositories>,
    AppQuery(filter): AppQuery<StoreFilter>,
) -> Result<impl IntoResponse, AppError> {
    let stores = service::list_stores_with_ratings(&repos, &filter).await?;
    Ok(Json(stores))
}

/// Creates a user with a specific role.
/// Admin only.
pub async fn create_user(
    State(repos): State<Repositories>,
    AppJson(payload): AppJson<AdminCreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = service::create_user(&repos, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully", "user": user })),
    ))
}
