// src/utils/jwt.rs

use std::{
    convert::Infallible,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    body::Body,
    extract::{FromRequestParts, MatchedPath, State},
    http::{HeaderMap, Request, header, request::Parts},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::Config,
    error::AppError,
    models::user::Role,
    routes::{Access, access_for},
};

/// JWT Claims structure. Access and refresh tokens share it and differ only
/// in signing secret and lifetime.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// User ID.
    pub id: Uuid,
    /// Role at the time the token was issued.
    pub role: Role,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// Signs a new JWT for the user.
pub fn sign_jwt(
    id: Uuid,
    role: Role,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    // Calculate expiration: current time + expiration_seconds
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs()
        + expiration_seconds;

    let claims = Claims {
        id,
        role,
        exp: expiration as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a JWT string.
///
/// Returns the `Claims` if valid, otherwise returns an `AppError`.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

    Ok(token_data.claims)
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Axum Middleware: route access control.
///
/// Looks up the matched route in the access table and enforces it:
/// * unknown route: 403 (deny by default);
/// * public: passes, attaching `Claims` when a valid token happens to be sent;
/// * authenticated: requires a valid access token, else 401;
/// * role: additionally requires the role, else 403.
///
/// Must be installed with `route_layer` so `MatchedPath` is available.
pub async fn access_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let access = req
        .extensions()
        .get::<MatchedPath>()
        .and_then(|path| access_for(req.method().as_str(), path.as_str()))
        .ok_or_else(|| AppError::Forbidden("Access denied".to_string()))?;

    let claims = bearer_token(req.headers()).map(|token| verify_jwt(token, &config.jwt_secret));

    match access {
        Access::Public => {
            if let Some(Ok(claims)) = claims {
                req.extensions_mut().insert(claims);
            }
        }
        Access::Authenticated | Access::Role(_) => {
            let claims = claims
                .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))??;

            if let Access::Role(required) = access {
                if claims.role != required {
                    tracing::debug!(user_id = %claims.id, role = %claims.role, "role check failed");
                    return Err(AppError::Forbidden("Access denied".to_string()));
                }
            }
            req.extensions_mut().insert(claims);
        }
    }

    Ok(next.run(req).await)
}

/// The authenticated caller, if any. Never rejects.
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<Claims>);

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Viewer(parts.extensions.get::<Claims>().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn signed_token_round_trips() {
        let id = Uuid::new_v4();
        let token = sign_jwt(id, Role::StoreOwner, "secret", 60).unwrap();
        let claims = verify_jwt(&token, "secret").unwrap();
        assert_eq!(claims.id, id);
        assert_eq!(claims.role, Role::StoreOwner);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = sign_jwt(Uuid::new_v4(), Role::User, "access", 60).unwrap();
        assert!(matches!(
            verify_jwt(&token, "refresh"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn bearer_prefix_is_required() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Token abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));
    }
}
