use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
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

const USER_COLUMNS: &str = "id, name, email, password, role, address, created_at, updated_at";
const STORE_COLUMNS: &str = "id, name, email, address, owner_id, created_at, updated_at";
const RATING_COLUMNS: &str = "id, store_id, user_id, value, created_at, updated_at";

/// sqlx-backed implementation of every repository trait.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Turns a user-supplied filter into an ILIKE pattern matching it literally
/// anywhere in the column. Empty filters match everything.
fn like_pattern(filter: &Option<String>) -> Option<String> {
    let text = filter.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{escaped}%"))
}

#[async_trait]
impl UserRepository for PgRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, RepoError> {
        let now = Utc::now();
        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, name, email, password, role, address, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.role.as_str())
        .bind(user.address)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let user =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, RepoError> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE ($1::TEXT IS NULL OR name ILIKE $1 ESCAPE '\')
              AND ($2::TEXT IS NULL OR email ILIKE $2 ESCAPE '\')
              AND ($3::TEXT IS NULL OR address ILIKE $3 ESCAPE '\')
              AND ($4::TEXT IS NULL OR role = $4)
            ORDER BY created_at
            "#
        ))
        .bind(like_pattern(&filter.name))
        .bind(like_pattern(&filter.email))
        .bind(like_pattern(&filter.address))
        .bind(filter.role.map(|r| r.as_str()))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, RepoError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE users SET updated_at = ");
        builder.push_bind(Utc::now());

        if let Some(name) = changes.name {
            builder.push(", name = ");
            builder.push_bind(name);
        }

        if let Some(email) = changes.email {
            builder.push(", email = ");
            builder.push_bind(email);
        }

        if let Some(address) = changes.address {
            builder.push(", address = ");
            builder.push_bind(address);
        }

        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(format!(" RETURNING {USER_COLUMNS}"));

        let user = builder
            .build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, RepoError> {
        let result = sqlx::query("UPDATE users SET password = $1, updated_at = $2 WHERE id = $3")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_users(&self) -> Result<i64, RepoError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl StoreRepository for PgRepository {
    async fn create_store(&self, store: NewStore) -> Result<Store, RepoError> {
        let now = Utc::now();
        let created = sqlx::query_as::<_, Store>(&format!(
            r#"
            INSERT INTO stores (id, name, email, address, owner_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {STORE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(store.name)
        .bind(store.email)
        .bind(store.address)
        .bind(store.owner_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_store(&self, id: Uuid) -> Result<Option<Store>, RepoError> {
        let store = sqlx::query_as::<_, Store>(&format!(
            "SELECT {STORE_COLUMNS} FROM stores WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(store)
    }

    async fn find_store_by_owner(&self, owner_id: Uuid) -> Result<Option<Store>, RepoError> {
        let store = sqlx::query_as::<_, Store>(&format!(
            "SELECT {STORE_COLUMNS} FROM stores WHERE owner_id = $1 ORDER BY created_at LIMIT 1"
        ))
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(store)
    }

    async fn list_stores(&self, filter: &StoreFilter) -> Result<Vec<Store>, RepoError> {
        let stores = sqlx::query_as::<_, Store>(&format!(
            r#"
            SELECT {STORE_COLUMNS}
            FROM stores
            WHERE ($1::TEXT IS NULL OR name ILIKE $1 ESCAPE '\')
              AND ($2::TEXT IS NULL OR email ILIKE $2 ESCAPE '\')
              AND ($3::TEXT IS NULL OR address ILIKE $3 ESCAPE '\')
            ORDER BY created_at
            "#
        ))
        .bind(like_pattern(&filter.name))
        .bind(like_pattern(&filter.email))
        .bind(like_pattern(&filter.address))
        .fetch_all(&self.pool)
        .await?;
        Ok(stores)
    }

    async fn update_store(
        &self,
        id: Uuid,
        changes: StoreChanges,
    ) -> Result<Option<Store>, RepoError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE stores SET updated_at = ");
        builder.push_bind(Utc::now());

        if let Some(name) = changes.name {
            builder.push(", name = ");
            builder.push_bind(name);
        }

        if let Some(email) = changes.email {
            builder.push(", email = ");
            builder.push_bind(email);
        }

        if let Some(address) = changes.address {
            builder.push(", address = ");
            builder.push_bind(address);
        }

        if let Some(owner_id) = changes.owner_id {
            builder.push(", owner_id = ");
            builder.push_bind(owner_id);
        }

        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(format!(" RETURNING {STORE_COLUMNS}"));

        let store = builder
            .build_query_as::<Store>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(store)
    }

    async fn delete_store(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM stores WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_stores(&self) -> Result<i64, RepoError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stores")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl RatingRepository for PgRepository {
    async fn find_rating(
        &self,
        store_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Rating>, RepoError> {
        let rating = sqlx::query_as::<_, Rating>(&format!(
            "SELECT {RATING_COLUMNS} FROM ratings WHERE store_id = $1 AND user_id = $2"
        ))
        .bind(store_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rating)
    }

    async fn insert_rating(
        &self,
        store_id: Uuid,
        user_id: Uuid,
        value: i32,
    ) -> Result<Rating, RepoError> {
        let now = Utc::now();
        let rating = sqlx::query_as::<_, Rating>(&format!(
            r#"
            INSERT INTO ratings (id, store_id, user_id, value, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING {RATING_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(store_id)
        .bind(user_id)
        .bind(value)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(rating)
    }

    async fn update_rating(
        &self,
        store_id: Uuid,
        user_id: Uuid,
        value: i32,
    ) -> Result<Option<Rating>, RepoError> {
        let rating = sqlx::query_as::<_, Rating>(&format!(
            r#"
            UPDATE ratings SET value = $1, updated_at = $2
            WHERE store_id = $3 AND user_id = $4
            RETURNING {RATING_COLUMNS}
            "#
        ))
        .bind(value)
        .bind(Utc::now())
        .bind(store_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rating)
    }

    async fn list_ratings_for_store(
        &self,
        store_id: Uuid,
    ) -> Result<Vec<RatingWithUser>, RepoError> {
        let ratings = sqlx::query_as::<_, RatingWithUser>(
            r#"
            SELECT
                r.id, r.store_id, r.user_id, r.value, r.created_at, r.updated_at,
                u.name AS user_name
            FROM ratings r
            LEFT JOIN users u ON r.user_id = u.id
            WHERE r.store_id = $1
            ORDER BY r.created_at
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ratings)
    }

    async fn average_rating(&self, store_id: Uuid) -> Result<Option<f64>, RepoError> {
        let avg = sqlx::query_scalar::<_, Option<f64>>(
            "SELECT AVG(value)::FLOAT8 FROM ratings WHERE store_id = $1",
        )
        .bind(store_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(avg)
    }

    async fn count_ratings(&self) -> Result<i64, RepoError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ratings")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(&Some("50%_off".into())).as_deref(), Some("%50\\%\\_off%"));
    }

    #[test]
    fn blank_filters_are_ignored() {
        assert_eq!(like_pattern(&None), None);
        assert_eq!(like_pattern(&Some("   ".into())), None);
    }
}
