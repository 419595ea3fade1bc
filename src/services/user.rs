use uuid::Uuid;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{
        LoginRequest, LoginResponse, Role, SignupRequest, UpdatePasswordRequest,
        UpdateProfileRequest, User,
    },
    repository::{NewUser, RepoError, Repositories, UserChanges},
    utils::{
        hash::{hash_password, verify_password},
        jwt::{sign_jwt, verify_jwt},
    },
};

/// Input shared by every path that creates an account.
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub address: String,
}

/// Creates an account after the caller has validated the fields.
/// The email must not be registered yet (exact match).
pub async fn create_account(repos: &Repositories, account: NewAccount) -> Result<User, AppError> {
    if repos
        .users
        .find_user_by_email(&account.email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let password_hash = hash_password(&account.password).await?;

    let user = repos
        .users
        .create_user(NewUser {
            name: account.name,
            email: account.email,
            password_hash,
            role: account.role,
            address: account.address,
        })
        .await
        .map_err(|e| match e {
            // lost a race with another signup for the same email
            RepoError::UniqueViolation(_) => AppError::Conflict("User already exists".to_string()),
            other => other.into(),
        })?;

    tracing::info!(user_id = %user.id, role = %user.role, "user_registered");
    Ok(user)
}

/// Registers a shopper. The role is always USER.
pub async fn signup(repos: &Repositories, payload: SignupRequest) -> Result<User, AppError> {
    payload.validate()?;

    create_account(
        repos,
        NewAccount {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            role: Role::User,
            address: payload.address,
        },
    )
    .await
}

/// Checks credentials and issues an access/refresh token pair.
/// Unknown email and wrong password fail identically.
pub async fn login(
    repos: &Repositories,
    config: &Config,
    payload: LoginRequest,
) -> Result<LoginResponse, AppError> {
    payload.validate()?;

    let user = repos
        .users
        .find_user_by_email(&payload.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&payload.password, &user.password).await? {
        return Err(AppError::InvalidCredentials);
    }

    let access_token = sign_jwt(user.id, user.role, &config.jwt_secret, config.jwt_expiration)?;
    let refresh_token = sign_jwt(
        user.id,
        user.role,
        &config.jwt_refresh_secret,
        config.jwt_refresh_expiration,
    )?;

    tracing::info!(user_id = %user.id, "user_logged_in");
    Ok(LoginResponse {
        message: "Login successful",
        access_token,
        refresh_token,
        user,
    })
}

/// Exchanges a refresh token for a new access token carrying the user's current role.
pub async fn refresh_access_token(
    repos: &Repositories,
    config: &Config,
    refresh_token: &str,
) -> Result<String, AppError> {
    let claims = verify_jwt(refresh_token, &config.jwt_refresh_secret)?;

    let user = repos
        .users
        .find_user(claims.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid token".to_string()))?;

    sign_jwt(user.id, user.role, &config.jwt_secret, config.jwt_expiration)
}

pub async fn get_user_profile(repos: &Repositories, id: Uuid) -> Result<User, AppError> {
    repos
        .users
        .find_user(id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))
}

/// Applies the supplied, non-empty profile fields. A new email must not belong
/// to another user.
pub async fn update_user_profile(
    repos: &Repositories,
    id: Uuid,
    patch: UpdateProfileRequest,
) -> Result<User, AppError> {
    let patch = UpdateProfileRequest {
        name: patch.name.filter(|v| !v.is_empty()),
        email: patch.email.filter(|v| !v.is_empty()),
        address: patch.address.filter(|v| !v.is_empty()),
    };
    patch.validate()?;

    if let Some(email) = &patch.email {
        if let Some(holder) = repos.users.find_user_by_email(email).await? {
            if holder.id != id {
                return Err(AppError::Conflict("Email already in use".to_string()));
            }
        }
    }

    let user = repos
        .users
        .update_user(
            id,
            UserChanges {
                name: patch.name,
                email: patch.email,
                address: patch.address,
            },
        )
        .await
        .map_err(|e| match e {
            RepoError::UniqueViolation(_) => AppError::Conflict("Email already in use".to_string()),
            other => other.into(),
        })?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %user.id, "user_profile_updated");
    Ok(user)
}

/// Changes a password after verifying the old one. No tokens are reissued.
pub async fn update_password(
    repos: &Repositories,
    id: Uuid,
    payload: UpdatePasswordRequest,
) -> Result<(), AppError> {
    let user = get_user_profile(repos, id).await?;

    if !verify_password(&payload.old_password, &user.password).await? {
        return Err(AppError::InvalidCredentials);
    }

    payload.validate()?;

    let password_hash = hash_password(&payload.new_password).await?;
    if !repos.users.update_password(id, &password_hash).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %id, "user_password_updated");
    Ok(())
}
