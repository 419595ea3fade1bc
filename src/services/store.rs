use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::store::{
        CreateStoreRequest, OwnerSummary, Store, StoreDetails, StoreFilter, StoreListItem,
        UpdateStoreRequest,
    },
    repository::{NewStore, Repositories, StoreChanges},
    services::rating::average_rating_for_store,
};

/// Resolves a store's weak owner reference. A dangling id yields `None`.
pub async fn resolve_owner(
    repos: &Repositories,
    owner_id: Option<Uuid>,
) -> Result<Option<OwnerSummary>, AppError> {
    let Some(owner_id) = owner_id else {
        return Ok(None);
    };
    Ok(repos
        .users
        .find_user(owner_id)
        .await?
        .map(|owner| OwnerSummary {
            name: owner.name,
            email: owner.email,
        }))
}

async fn details(repos: &Repositories, store: Store) -> Result<StoreDetails, AppError> {
    let owner = resolve_owner(repos, store.owner_id).await?;
    let avg_rating = average_rating_for_store(repos, store.id).await?;
    Ok(StoreDetails {
        id: store.id,
        name: store.name,
        email: store.email,
        address: store.address,
        owner,
        avg_rating,
    })
}

/// Creates a store. The owner id is stored as given; it is not checked.
pub async fn create_store(
    repos: &Repositories,
    payload: CreateStoreRequest,
) -> Result<Store, AppError> {
    payload.validate()?;

    let store = repos
        .stores
        .create_store(NewStore {
            name: payload.name,
            email: payload.email,
            address: payload.address,
            owner_id: payload.owner_id,
        })
        .await?;

    tracing::info!(store_id = %store.id, "store_created");
    Ok(store)
}

/// Lists stores matching the filter, each with owner, average rating and the
/// viewer's own rating (null when there is no viewer or they have not rated).
pub async fn list_stores(
    repos: &Repositories,
    filter: &StoreFilter,
    viewer: Option<Uuid>,
) -> Result<Vec<StoreListItem>, AppError> {
    let stores = repos.stores.list_stores(filter).await?;

    let mut items = Vec::with_capacity(stores.len());
    for store in stores {
        let user_rating = match viewer {
            Some(user_id) => repos
                .ratings
                .find_rating(store.id, user_id)
                .await?
                .map(|r| r.value),
            None => None,
        };
        items.push(StoreListItem {
            store: details(repos, store).await?,
            user_rating,
        });
    }

    Ok(items)
}

pub async fn get_store_by_id(repos: &Repositories, id: Uuid) -> Result<StoreDetails, AppError> {
    let store = repos
        .stores
        .find_store(id)
        .await?
        .ok_or(AppError::NotFound("Store not found".to_string()))?;

    details(repos, store).await
}

/// Applies a validated patch. An empty patch returns the store unchanged.
pub async fn update_store(
    repos: &Repositories,
    id: Uuid,
    patch: UpdateStoreRequest,
) -> Result<Store, AppError> {
    patch.validate()?;

    if patch.is_empty() {
        return repos
            .stores
            .find_store(id)
            .await?
            .ok_or(AppError::NotFound("Store not found".to_string()));
    }

    let store = repos
        .stores
        .update_store(
            id,
            StoreChanges {
                name: patch.name,
                email: patch.email,
                address: patch.address,
                owner_id: patch.owner_id,
            },
        )
        .await?
        .ok_or(AppError::NotFound("Store not found".to_string()))?;

    tracing::info!(store_id = %store.id, "store_updated");
    Ok(store)
}

/// Deletes a store. Its ratings are left in place.
pub async fn delete_store(repos: &Repositories, id: Uuid) -> Result<(), AppError> {
    if !repos.stores.delete_store(id).await? {
        return Err(AppError::NotFound("Store not found".to_string()));
    }
    tracing::info!(store_id = %id, "store_deleted");
    Ok(())
}
