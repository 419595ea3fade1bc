// src/config.rs

use std::{env, str::FromStr};

use dotenvy::dotenv;
use thiserror::Error;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value: '{value}'")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. When absent the server keeps its data in memory.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    pub jwt_expiration: u64,
    pub jwt_refresh_secret: String,
    /// Refresh token lifetime in seconds.
    pub jwt_refresh_expiration: u64,
    pub port: u16,
    pub rust_log: String,
    pub admin_name: Option<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        Ok(Self {
            database_url: optional("DATABASE_URL"),
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiration: parsed("JWT_EXPIRATION", 3600)?,
            jwt_refresh_secret: required("JWT_REFRESH_SECRET")?,
            jwt_refresh_expiration: parsed("JWT_REFRESH_EXPIRATION", 7 * 24 * 3600)?,
            port: parsed("PORT", 5001)?,
            rust_log: optional("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            admin_name: optional("ADMIN_NAME"),
            admin_email: optional("ADMIN_EMAIL"),
            admin_password: optional("ADMIN_PASSWORD"),
        })
    }
}

fn optional(var: &'static str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    optional(var).ok_or(ConfigError::Missing(var))
}

fn parsed<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default),
    }
}
