use uuid::Uuid;

use crate::{
    error::AppError,
    models::rating::{Rating, RatingWithUser},
    repository::{RepoError, Repositories},
};

/// Outcome of a rating submission.
#[derive(Debug)]
pub enum Submitted {
    Created(Rating),
    Updated(Rating),
}

impl Submitted {
    pub fn rating(&self) -> &Rating {
        match self {
            Submitted::Created(r) | Submitted::Updated(r) => r,
        }
    }
}

/// Records `user_id`'s rating of `store_id`, replacing any earlier one.
///
/// The pair is unique in storage. If a concurrent request creates the pair
/// between our lookup and our insert, the insert's unique violation is turned
/// into an update of the row the other request wrote.
pub async fn submit_rating(
    repos: &Repositories,
    store_id: Uuid,
    user_id: Uuid,
    value: i32,
) -> Result<Submitted, AppError> {
    if !(1..=5).contains(&value) {
        return Err(AppError::BadRequest(
            "Rating must be between 1 and 5".to_string(),
        ));
    }

    repos
        .stores
        .find_store(store_id)
        .await?
        .ok_or(AppError::NotFound("Store not found".to_string()))?;
    repos
        .users
        .find_user(user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    if repos.ratings.find_rating(store_id, user_id).await?.is_some() {
        return update_existing(repos, store_id, user_id, value).await;
    }

    match repos.ratings.insert_rating(store_id, user_id, value).await {
        Ok(rating) => {
            tracing::info!(%store_id, %user_id, value, "rating_created");
            Ok(Submitted::Created(rating))
        }
        Err(RepoError::UniqueViolation(_)) => {
            tracing::debug!(%store_id, %user_id, "rating insert lost race, updating instead");
            update_existing(repos, store_id, user_id, value).await
        }
        Err(e) => Err(e.into()),
    }
}

async fn update_existing(
    repos: &Repositories,
    store_id: Uuid,
    user_id: Uuid,
    value: i32,
) -> Result<Submitted, AppError> {
    let rating = repos
        .ratings
        .update_rating(store_id, user_id, value)
        .await?
        .ok_or_else(|| {
            AppError::InternalServerError(format!(
                "rating for store {store_id} and user {user_id} vanished during update"
            ))
        })?;
    tracing::info!(%store_id, %user_id, value, "rating_updated");
    Ok(Submitted::Updated(rating))
}

/// All ratings of a store with the rater's name, oldest first.
pub async fn list_ratings_for_store(
    repos: &Repositories,
    store_id: Uuid,
) -> Result<Vec<RatingWithUser>, AppError> {
    Ok(repos.ratings.list_ratings_for_store(store_id).await?)
}

/// Mean rating of a store; 0 when nobody has rated it.
pub async fn average_rating_for_store(
    repos: &Repositories,
    store_id: Uuid,
) -> Result<f64, AppError> {
    Ok(repos.ratings.average_rating(store_id).await?.unwrap_or(0.0))
}
