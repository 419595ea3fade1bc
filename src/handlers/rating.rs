// src/handlers/rating.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::rating::{AverageRating, SubmitRatingRequest},
    repository::Repositories,
    services::rating::{self as service, Submitted},
    utils::extract::{AppJson, AppPath},
};

/// Adds or replaces a user's rating of a store.
/// 201 when the rating is new, 200 when an earlier one was overwritten.
pub async fn submit_rating(
    State(repos): State<Repositories>,
    AppJson(payload): AppJson<SubmitRatingRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let outcome =
        service::submit_rating(&repos, payload.store_id, payload.user_id, payload.rating).await?;

    Ok(match outcome {
        Submitted::Created(rating) => (StatusCode::CREATED, Json(rating)),
        Submitted::Updated(rating) => (StatusCode::OK, Json(rating)),
    })
}

/// List all ratings for a store, with the rater's name.
pub async fn list_ratings(
    State(repos): State<Repositories>,
    AppPath(store_id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let ratings = service::list_ratings_for_store(&repos, store_id).await?;
    Ok(Json(ratings))
}

pub async fn average_rating(
    State(repos): State<Repositories>,
    AppPath(store_id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let avg_rating = service::average_rating_for_store(&repos, store_id).await?;
    Ok(Json(AverageRating { avg_rating }))
}
