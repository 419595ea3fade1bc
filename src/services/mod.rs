//! Business operations, independent of HTTP. Each function takes the shared
//! repositories and returns `AppError` on failure.

pub mod admin;
pub mod rating;
pub mod store;
pub mod user;
