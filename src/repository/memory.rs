use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    NewStore, NewUser, RatingRepository, RepoError, StoreChanges, StoreRepository, UserChanges,
    UserRepository,
};
use crate::models::{
    rating::{Rating, RatingWithUser},
    store::{Store, StoreFilter},
    user::{User, UserFilter},
};

/// In-process backend with the same constraints as the Postgres schema:
/// unique user email and one rating per (store, user) pair.
#[derive(Default)]
pub struct MemoryRepository {
    data: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    // Vecs keep insertion order, which is what listings return.
    users: Vec<User>,
    stores: Vec<Store>,
    ratings: Vec<Rating>,
}

/// Case-insensitive substring match; blank or absent filters match everything.
fn matches(filter: &Option<String>, value: Option<&str>) -> bool {
    match filter.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
        None => true,
        Some(needle) => value
            .map(|v| v.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false),
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, RepoError> {
        let mut data = self.data.write().await;
        if data.users.iter().any(|u| u.email == user.email) {
            return Err(RepoError::UniqueViolation("users_email_key".to_string()));
        }
        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password: user.password_hash,
            role: user.role,
            address: user.address,
            created_at: now,
            updated_at: now,
        };
        data.users.push(created.clone());
        Ok(created)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let data = self.data.read().await;
        Ok(data.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let data = self.data.read().await;
        Ok(data.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, RepoError> {
        let data = self.data.read().await;
        Ok(data
            .users
            .iter()
            .filter(|u| {
                matches(&filter.name, Some(&u.name))
                    && matches(&filter.email, Some(&u.email))
                    && matches(&filter.address, Some(&u.address))
                    && filter.role.is_none_or(|role| u.role == role)
            })
            .cloned()
            .collect())
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, RepoError> {
        let mut data = self.data.write().await;
        if let Some(email) = &changes.email {
            if data.users.iter().any(|u| u.id != id && &u.email == email) {
                return Err(RepoError::UniqueViolation("users_email_key".to_string()));
            }
        }
        let Some(user) = data.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(address) = changes.address {
            user.address = address;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, RepoError> {
        let mut data = self.data.write().await;
        match data.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.password = password_hash.to_string();
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_users(&self) -> Result<i64, RepoError> {
        Ok(self.data.read().await.users.len() as i64)
    }
}

#[async_trait]
impl StoreRepository for MemoryRepository {
    async fn create_store(&self, store: NewStore) -> Result<Store, RepoError> {
        let now = Utc::now();
        let created = Store {
            id: Uuid::new_v4(),
            name: store.name,
            email: store.email,
            address: store.address,
            owner_id: store.owner_id,
            created_at: now,
            updated_at: now,
        };
        self.data.write().await.stores.push(created.clone());
        Ok(created)
    }

    async fn find_store(&self, id: Uuid) -> Result<Option<Store>, RepoError> {
        let data = self.data.read().await;
        Ok(data.stores.iter().find(|s| s.id == id).cloned())
    }

    async fn find_store_by_owner(&self, owner_id: Uuid) -> Result<Option<Store>, RepoError> {
        let data = self.data.read().await;
        Ok(data
            .stores
            .iter()
            .find(|s| s.owner_id == Some(owner_id))
            .cloned())
    }

    async fn list_stores(&self, filter: &StoreFilter) -> Result<Vec<Store>, RepoError> {
        let data = self.data.read().await;
        Ok(data
            .stores
            .iter()
            .filter(|s| {
                matches(&filter.name, Some(&s.name))
                    && matches(&filter.email, s.email.as_deref())
                    && matches(&filter.address, Some(&s.address))
            })
            .cloned()
            .collect())
    }

    async fn update_store(
        &self,
        id: Uuid,
        changes: StoreChanges,
    ) -> Result<Option<Store>, RepoError> {
        let mut data = self.data.write().await;
        let Some(store) = data.stores.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            store.name = name;
        }
        if let Some(email) = changes.email {
            store.email = email;
        }
        if let Some(address) = changes.address {
            store.address = address;
        }
        if let Some(owner_id) = changes.owner_id {
            store.owner_id = owner_id;
        }
        store.updated_at = Utc::now();
        Ok(Some(store.clone()))
    }

    async fn delete_store(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut data = self.data.write().await;
        let before = data.stores.len();
        data.stores.retain(|s| s.id != id);
        Ok(data.stores.len() < before)
    }

    async fn count_stores(&self) -> Result<i64, RepoError> {
        Ok(self.data.read().await.stores.len() as i64)
    }
}

#[async_trait]
impl RatingRepository for MemoryRepository {
    async fn find_rating(
        &self,
        store_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Rating>, RepoError> {
        let data = self.data.read().await;
        Ok(data
            .ratings
            .iter()
            .find(|r| r.store_id == store_id && r.user_id == user_id)
            .cloned())
    }

    async fn insert_rating(
        &self,
        store_id: Uuid,
        user_id: Uuid,
        value: i32,
    ) -> Result<Rating, RepoError> {
        if !(1..=5).contains(&value) {
            return Err(RepoError::CheckViolation(
                "rating value must be between 1 and 5".to_string(),
            ));
        }
        let mut data = self.data.write().await;
        if data
            .ratings
            .iter()
            .any(|r| r.store_id == store_id && r.user_id == user_id)
        {
            return Err(RepoError::UniqueViolation(
                "ratings_store_user_unique".to_string(),
            ));
        }
        let now = Utc::now();
        let rating = Rating {
            id: Uuid::new_v4(),
            store_id,
            user_id,
            value,
            created_at: now,
            updated_at: now,
        };
        data.ratings.push(rating.clone());
        Ok(rating)
    }

    async fn update_rating(
        &self,
        store_id: Uuid,
        user_id: Uuid,
        value: i32,
    ) -> Result<Option<Rating>, RepoError> {
        if !(1..=5).contains(&value) {
            return Err(RepoError::CheckViolation(
                "rating value must be between 1 and 5".to_string(),
            ));
        }
        let mut data = self.data.write().await;
        let Some(rating) = data
            .ratings
            .iter_mut()
            .find(|r| r.store_id == store_id && r.user_id == user_id)
        else {
            return Ok(None);
        };
        rating.value = value;
        rating.updated_at = Utc::now();
        Ok(Some(rating.clone()))
    }

    async fn list_ratings_for_store(
        &self,
        store_id: Uuid,
    ) -> Result<Vec<RatingWithUser>, RepoError> {
        let data = self.data.read().await;
        Ok(data
            .ratings
            .iter()
            .filter(|r| r.store_id == store_id)
            .map(|r| RatingWithUser {
                rating: r.clone(),
                user_name: data
                    .users
                    .iter()
                    .find(|u| u.id == r.user_id)
                    .map(|u| u.name.clone()),
            })
            .collect())
    }

    async fn average_rating(&self, store_id: Uuid) -> Result<Option<f64>, RepoError> {
        let data = self.data.read().await;
        let values: Vec<i32> = data
            .ratings
            .iter()
            .filter(|r| r.store_id == store_id)
            .map(|r| r.value)
            .collect();
        if values.is_empty() {
            return Ok(None);
        }
        let sum: i64 = values.iter().map(|v| i64::from(*v)).sum();
        Ok(Some(sum as f64 / values.len() as f64))
    }

    async fn count_ratings(&self) -> Result<i64, RepoError> {
        Ok(self.data.read().await.ratings.len() as i64)
    }
}
