use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidationError};

/// Represents the 'stores' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub address: String,
    /// Weak reference to a user. May point at nobody.
    pub owner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Owner fields joined onto a store at read time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerSummary {
    pub name: String,
    pub email: String,
}

/// A store with its owner and average rating, as returned by the store lookup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDetails {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub address: String,
    pub owner: Option<OwnerSummary>,
    pub avg_rating: f64,
}

/// Store list row for shoppers: details plus the viewer's own rating.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreListItem {
    #[serde(flatten)]
    pub store: StoreDetails,
    pub user_rating: Option<i32>,
}

/// Store row for the admin listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStoreView {
    #[serde(flatten)]
    pub store: Store,
    pub owner: Option<OwnerSummary>,
    pub average_rating: f64,
}

/// DTO for creating a store.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreRequest {
    #[validate(length(
        min = 2,
        max = 60,
        message = "Name length must be between 2 and 60 characters."
    ))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: Option<String>,
    #[validate(length(
        min = 1,
        max = 400,
        message = "Address is required and must be at most 400 characters."
    ))]
    pub address: String,
    pub owner_id: Option<Uuid>,
}

/// Store patch. Fields that are absent stay untouched; `email` and `ownerId`
/// may also be sent as `null` to clear them.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_store_patch"))]
pub struct UpdateStoreRequest {
    #[validate(length(
        min = 2,
        max = 60,
        message = "Name length must be between 2 and 60 characters."
    ))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub email: Option<Option<String>>,
    #[validate(length(
        min = 1,
        max = 400,
        message = "Address must be between 1 and 400 characters."
    ))]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub owner_id: Option<Option<Uuid>>,
}

impl UpdateStoreRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.address.is_none()
            && self.owner_id.is_none()
    }
}

/// Marks a field that appeared in the body, so `null` reads as `Some(None)`
/// while an absent field stays `None` through `#[serde(default)]`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_store_patch(patch: &UpdateStoreRequest) -> Result<(), ValidationError> {
    match &patch.email {
        Some(Some(email)) if !email.validate_email() => Err(ValidationError::new("email")
            .with_message(Cow::Borrowed("Please enter a valid email"))),
        _ => Ok(()),
    }
}

/// Query parameters for store listings. Every filter is a case-insensitive substring match.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StoreFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}
