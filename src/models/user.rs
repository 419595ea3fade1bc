// src/models/user.rs

use std::{borrow::Cow, fmt, str::FromStr, sync::LazyLock};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, de};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

static HAS_UPPERCASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]").expect("static regex"));
static HAS_SPECIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[!@#$%^&*]").expect("static regex"));

/// Closed set of roles a user can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    User,
    StoreOwner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
            Role::StoreOwner => "STORE_OWNER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            "STORE_OWNER" => Ok(Role::StoreOwner),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    pub name: String,

    /// Unique email, matched exactly on login.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    #[sqlx(try_from = "String")]
    pub role: Role,

    pub address: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Summary of the store a STORE_OWNER runs, embedded in the admin user list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedStoreSummary {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub average_rating: f64,
}

/// User row as shown to admins. `store` is only present for owners that run one.
#[derive(Debug, Clone, Serialize)]
pub struct UserWithStore {
    #[serde(flatten)]
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<OwnedStoreSummary>,
}

/// Password policy shared by signup, admin user creation and password change:
/// 8 to 16 characters, one uppercase letter and one of `!@#$%^&*`.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let length = password.chars().count();
    if !(8..=16).contains(&length) {
        return Err(ValidationError::new("password_length")
            .with_message(Cow::Borrowed("Password must be 8-16 characters")));
    }
    if !HAS_UPPERCASE.is_match(password) || !HAS_SPECIAL.is_match(password) {
        return Err(ValidationError::new("password_composition").with_message(Cow::Borrowed(
            "Password must include at least one uppercase letter and one special character",
        )));
    }
    Ok(())
}

fn validate_role(role: &str) -> Result<(), ValidationError> {
    role.parse::<Role>().map(|_| ()).map_err(|_| {
        ValidationError::new("role").with_message(Cow::Borrowed("Invalid role specified"))
    })
}

/// DTO for signing up. Any role sent by the client is ignored.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(
        min = 20,
        max = 60,
        message = "Name length must be between 20 and 60 characters."
    ))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
    #[validate(length(
        min = 1,
        max = 400,
        message = "Address is required and must be at most 400 characters."
    ))]
    pub address: String,
}

/// DTO for admins creating a user with an explicit role.
#[derive(Debug, Deserialize, Validate)]
pub struct AdminCreateUserRequest {
    #[validate(length(
        min = 20,
        max = 60,
        message = "Name length must be between 20 and 60 characters."
    ))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
    #[validate(custom(function = "validate_role"))]
    pub role: String,
    #[validate(length(
        min = 1,
        max = 400,
        message = "Address is required and must be at most 400 characters."
    ))]
    pub address: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email and password are required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Email and password are required"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Profile patch. Only the listed fields can change; each supplied one is
/// validated with the signup rules.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(
        min = 20,
        max = 60,
        message = "Name length must be between 20 and 60 characters."
    ))]
    pub name: Option<String>,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: Option<String>,
    #[validate(length(max = 400, message = "Address must be at most 400 characters."))]
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub old_password: String,
    #[validate(custom(function = "validate_password"))]
    pub new_password: String,
}

/// Query parameters for the admin user list.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UserFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    /// Blank means no role filter; anything else must name a role.
    #[serde(default, deserialize_with = "blank_role_as_none")]
    pub role: Option<Role>,
}

fn blank_role_as_none<'de, D>(deserializer: D) -> Result<Option<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(role) => role.parse().map(Some).map_err(de::Error::custom),
    }
}

/// Login result: both tokens plus the public user fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: &'static str,
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}
