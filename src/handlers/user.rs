// src/handlers/user.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use uuid::Uuid;

use crate::{
    config::Config,
    error::AppError,
    models::user::{
        LoginRequest, RefreshRequest, SignupRequest, UpdatePasswordRequest, UpdateProfileRequest,
    },
    repository::Repositories,
    services::user as service,
    utils::extract::{AppJson, AppPath},
};

/// Registers a new shopper account.
///
/// The role is always USER. Returns 201 Created and the user (without password).
pub async fn signup(
    State(repos): State<Repositories>,
    AppJson(payload): AppJson<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = service::signup(&repos, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully", "user": user })),
    ))
}

/// Authenticates a user and returns an access token and a refresh token.
pub async fn login(
    State(repos): State<Repositories>,
    State(config): State<Config>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = service::login(&repos, &config, payload).await?;
    Ok(Json(session))
}

/// Issues a fresh access token for a valid refresh token.
pub async fn refresh(
    State(repos): State<Repositories>,
    State(config): State<Config>,
    AppJson(payload): AppJson<RefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    let access_token =
        service::refresh_access_token(&repos, &config, &payload.refresh_token).await?;
    Ok(Json(json!({ "accessToken": access_token })))
}

pub async fn get_profile(
    State(repos): State<Repositories>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user = service::get_user_profile(&repos, id).await?;
    Ok(Json(user))
}

/// Updates name, email and/or address. Absent or empty fields are left as they are.
pub async fn update_profile(
    State(repos): State<Repositories>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = service::update_user_profile(&repos, id, payload).await?;
    Ok(Json(
        json!({ "message": "Profile updated successfully", "user": user }),
    ))
}

pub async fn update_password(
    State(repos): State<Repositories>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdatePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    service::update_password(&repos, id, payload).await?;
    Ok(Json(json!({ "message": "Password updated successfully" })))
}
