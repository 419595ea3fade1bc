// src/handlers/store.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::store::{CreateStoreRequest, StoreFilter, UpdateStoreRequest},
    repository::Repositories,
    services::store as service,
    utils::{
        extract::{AppJson, AppPath, AppQuery},
        jwt::Viewer,
    },
};

/// Lists stores, optionally filtered by name, email and address.
/// Each row carries the caller's own rating when they have one.
pub async fn list_stores(
    State(repos): State<Repositories>,
    Viewer(viewer): Viewer,
    AppQuery(filter): AppQuery<StoreFilter>,
) -> Result<impl IntoResponse, AppError> {
    let stores = service::list_stores(&repos, &filter, viewer.map(|c| c.id)).await?;
    Ok(Json(stores))
}

/// Retrieves a single store by ID.
/// A malformed ID is rejected with 400 before the lookup.
pub async fn get_store(
    State(repos): State<Repositories>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let store = service::get_store_by_id(&repos, id).await?;
    Ok(Json(store))
}

/// Creates a new store.
/// Admin only.
pub async fn create_store(
    State(repos): State<Repositories>,
    AppJson(payload): AppJson<CreateStoreRequest>,
) -> Result<impl IntoResponse, AppError> {
    let store = service::create_store(&repos, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Store created successfully", "store": store })),
    ))
}

/// Updates a store by ID.
/// Admin only.
pub async fn update_store(
    State(repos): State<Repositories>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateStoreRequest>,
) -> Result<impl IntoResponse, AppError> {
    let store = service::update_store(&repos, id, payload).await?;
    Ok(Json(
        json!({ "message": "Store updated successfully", "store": store }),
    ))
}

/// Deletes a store by ID. Its ratings are kept.
/// Admin only.
pub async fn delete_store(
    State(repos): State<Repositories>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    service::delete_store(&repos, id).await?;
    Ok(Json(json!({ "message": "Store deleted successfully" })))
}
