// src/models/mod.rs

pub mod rating;
pub mod store;
pub mod user;
