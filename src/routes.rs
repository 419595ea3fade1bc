// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{self, admin, rating, store, user},
    models::user::Role,
    state::AppState,
    utils::jwt::access_middleware,
};

/// Who may call a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Any valid access token.
    Authenticated,
    /// A valid access token whose role matches.
    Role(Role),
}

#[derive(Debug)]
pub struct AccessRule {
    pub method: &'static str,
    pub path: &'static str,
    pub access: Access,
}

const fn rule(method: &'static str, path: &'static str, access: Access) -> AccessRule {
    AccessRule {
        method,
        path,
        access,
    }
}

const ADMIN: Access = Access::Role(Role::Admin);

/// Access policy for every route. A route missing here is refused with 403.
///
/// The rating routes are public: nothing ties `userId` in the body to the
/// caller. Whether that is intended is still an open product question.
pub const ACCESS_RULES: &[AccessRule] = &[
    rule("GET", "/health", Access::Public),
    // user
    rule("POST", "/api/user/signup", Access::Public),
    rule("POST", "/api/user/login", Access::Public),
    rule("POST", "/api/user/refresh", Access::Public),
    rule("GET", "/api/user/{id}", Access::Authenticated),
    rule("PUT", "/api/user/{id}", Access::Authenticated),
    rule("PUT", "/api/user/{id}/password", Access::Authenticated),
    // store
    rule("GET", "/api/store", Access::Authenticated),
    rule("POST", "/api/store", ADMIN),
    rule("GET", "/api/store/{id}", Access::Authenticated),
    rule("PUT", "/api/store/{id}", ADMIN),
    rule("DELETE", "/api/store/{id}", ADMIN),
    // rating
    rule("POST", "/api/rating", Access::Public),
    rule("GET", "/api/rating/{storeId}", Access::Public),
    rule("GET", "/api/rating/{storeId}/average", Access::Public),
    // admin
    rule("GET", "/api/admin/dashboard", ADMIN),
    rule("GET", "/api/admin/users", ADMIN),
    rule("GET", "/api/admin/stores", ADMIN),
    rule("POST", "/api/admin/create-user", ADMIN),
];

/// Looks up the access rule for a method and matched route path.
pub fn access_for(method: &str, path: &str) -> Option<Access> {
    ACCESS_RULES
        .iter()
        .find(|r| r.method == method && r.path == path)
        .map(|r| r.access)
}

/// Assembles the main application router.
///
/// * Registers every route listed in `ACCESS_RULES`.
/// * Enforces the table with `access_middleware` after routing.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:5173"),
        HeaderValue::from_static("http://127.0.0.1:5173"),
        HeaderValue::from_static("http://localhost:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(handlers::health))
        // user
        .route("/api/user/signup", post(user::signup))
        .route("/api/user/login", post(user::login))
        .route("/api/user/refresh", post(user::refresh))
        .route(
            "/api/user/{id}",
            get(user::get_profile).put(user::update_profile),
        )
        .route("/api/user/{id}/password", put(user::update_password))
        // store
        .route(
            "/api/store",
            get(store::list_stores).post(store::create_store),
        )
        .route(
            "/api/store/{id}",
            get(store::get_store)
                .put(store::update_store)
                .delete(store::delete_store),
        )
        // rating
        .route("/api/rating", post(rating::submit_rating))
        .route("/api/rating/{storeId}", get(rating::list_ratings))
        .route("/api/rating/{storeId}/average", get(rating::average_rating))
        // admin
        .route("/api/admin/dashboard", get(admin::dashboard))
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/stores", get(admin::list_stores))
        .route("/api/admin/create-user", post(admin::create_user))
        // Runs after routing, so the matched path is known.
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            access_middleware,
        ))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_are_unique() {
        for (i, a) in ACCESS_RULES.iter().enumerate() {
            for b in &ACCESS_RULES[i + 1..] {
                assert!(
                    !(a.method == b.method && a.path == b.path),
                    "duplicate rule for {} {}",
                    a.method,
                    a.path
                );
            }
        }
    }

    #[test]
    fn unknown_routes_have_no_rule() {
        assert_eq!(access_for("GET", "/api/secret"), None);
        assert_eq!(access_for("PATCH", "/api/store/{id}"), None);
    }

    #[test]
    fn store_writes_need_admin() {
        for method in ["PUT", "DELETE"] {
            assert_eq!(access_for(method, "/api/store/{id}"), Some(ADMIN));
        }
        assert_eq!(access_for("POST", "/api/store"), Some(ADMIN));
        assert_eq!(access_for("GET", "/api/store"), Some(Access::Authenticated));
    }
}
