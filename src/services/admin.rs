use serde::Serialize;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        store::{AdminStoreView, StoreFilter},
        user::{AdminCreateUserRequest, OwnedStoreSummary, Role, User, UserFilter, UserWithStore},
    },
    repository::Repositories,
    services::{
        rating::average_rating_for_store,
        store::resolve_owner,
        user::{NewAccount, create_account},
    },
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_stores: i64,
    pub total_ratings: i64,
}

/// Admin views show averages to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Three independent counts; they may disagree briefly under concurrent writes.
pub async fn dashboard_stats(repos: &Repositories) -> Result<DashboardStats, AppError> {
    Ok(DashboardStats {
        total_users: repos.users.count_users().await?,
        total_stores: repos.stores.count_stores().await?,
        total_ratings: repos.ratings.count_ratings().await?,
    })
}

/// Lists users; store owners that run a store get it attached with its average.
pub async fn list_users_with_filters(
    repos: &Repositories,
    filter: &UserFilter,
) -> Result<Vec<UserWithStore>, AppError> {
    let users = repos.users.list_users(filter).await?;

    let mut rows = Vec::with_capacity(users.len());
    for user in users {
        let store = match user.role {
            Role::StoreOwner => match repos.stores.find_store_by_owner(user.id).await? {
                Some(store) => Some(OwnedStoreSummary {
                    average_rating: round2(average_rating_for_store(repos, store.id).await?),
                    id: store.id,
                    name: store.name,
                    address: store.address,
                }),
                None => None,
            },
            _ => None,
        };
        rows.push(UserWithStore { user, store });
    }

    Ok(rows)
}

pub async fn list_stores_with_ratings(
    repos: &Repositories,
    filter: &StoreFilter,
) -> Result<Vec<AdminStoreView>, AppError> {
    let stores = repos.stores.list_stores(filter).await?;

    let mut rows = Vec::with_capacity(stores.len());
    for store in stores {
        let owner = resolve_owner(repos, store.owner_id).await?;
        let average_rating = round2(average_rating_for_store(repos, store.id).await?);
        rows.push(AdminStoreView {
            store,
            owner,
            average_rating,
        });
    }

    Ok(rows)
}

/// Creates a user with a caller-chosen role, under the signup rules.
pub async fn create_user(
    repos: &Repositories,
    payload: AdminCreateUserRequest,
) -> Result<User, AppError> {
    payload.validate()?;
    let role = payload
        .role
        .parse::<Role>()
        .map_err(|_| AppError::BadRequest("Invalid role specified".to_string()))?;

    create_account(
        repos,
        NewAccount {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            role,
            address: payload.address,
        },
    )
    .await
}
