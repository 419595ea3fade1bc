//! Persistence seams. Services only talk to these traits; `postgres` backs
//! them with sqlx and `memory` keeps everything in process.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    rating::{Rating, RatingWithUser},
    store::{Store, StoreFilter},
    user::{Role, User, UserFilter},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0}")]
    UniqueViolation(String),

    #[error("{0}")]
    CheckViolation(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return RepoError::UniqueViolation(
                    db_err.constraint().unwrap_or("unique constraint").to_string(),
                );
            }
            if db_err.is_check_violation() {
                return RepoError::CheckViolation(db_err.message().to_string());
            }
        }
        RepoError::Database(err)
    }
}

pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub address: String,
}

#[derive(Debug, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

pub struct NewStore {
    pub name: String,
    pub email: Option<String>,
    pub address: String,
    pub owner_id: Option<Uuid>,
}

/// `Some(None)` clears a nullable column.
#[derive(Debug, Default)]
pub struct StoreChanges {
    pub name: Option<String>,
    pub email: Option<Option<String>>,
    pub address: Option<String>,
    pub owner_id: Option<Option<Uuid>>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `UniqueViolation` when the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, RepoError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, RepoError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, RepoError>;
    /// Returns `None` when the user does not exist.
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, RepoError>;
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, RepoError>;
    async fn count_users(&self) -> Result<i64, RepoError>;
}

#[async_trait]
pub trait StoreRepository: Send + Sync {
    async fn create_store(&self, store: NewStore) -> Result<Store, RepoError>;
    async fn find_store(&self, id: Uuid) -> Result<Option<Store>, RepoError>;
    /// Oldest store owned by the given user, if any.
    async fn find_store_by_owner(&self, owner_id: Uuid) -> Result<Option<Store>, RepoError>;
    async fn list_stores(&self, filter: &StoreFilter) -> Result<Vec<Store>, RepoError>;
    async fn update_store(&self, id: Uuid, changes: StoreChanges)
    -> Result<Option<Store>, RepoError>;
    async fn delete_store(&self, id: Uuid) -> Result<bool, RepoError>;
    async fn count_stores(&self) -> Result<i64, RepoError>;
}

#[async_trait]
pub trait RatingRepository: Send + Sync {
    async fn find_rating(&self, store_id: Uuid, user_id: Uuid)
    -> Result<Option<Rating>, RepoError>;
    /// Fails with `UniqueViolation` when the (store, user) pair already has a rating.
    async fn insert_rating(
        &self,
        store_id: Uuid,
        user_id: Uuid,
        value: i32,
    ) -> Result<Rating, RepoError>;
    /// Overwrites the value of the pair's rating. `None` when the pair has none.
    async fn update_rating(
        &self,
        store_id: Uuid,
        user_id: Uuid,
        value: i32,
    ) -> Result<Option<Rating>, RepoError>;
    async fn list_ratings_for_store(&self, store_id: Uuid)
    -> Result<Vec<RatingWithUser>, RepoError>;
    /// Mean rating value, `None` when the store has no ratings.
    async fn average_rating(&self, store_id: Uuid) -> Result<Option<f64>, RepoError>;
    async fn count_ratings(&self) -> Result<i64, RepoError>;
}

/// Handles to every repository, shared by all handlers.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub stores: Arc<dyn StoreRepository>,
    pub ratings: Arc<dyn RatingRepository>,
}

impl Repositories {
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self::from_backend(Arc::new(PgRepository::new(pool)))
    }

    pub fn in_memory() -> Self {
        Self::from_backend(Arc::new(MemoryRepository::default()))
    }

    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: UserRepository + StoreRepository + RatingRepository + 'static,
    {
        Self {
            users: backend.clone(),
            stores: backend.clone(),
            ratings: backend,
        }
    }
}
