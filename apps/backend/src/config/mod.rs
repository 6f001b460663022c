//! Environment-driven configuration, read once at startup.

pub mod db;
pub mod redis;
pub mod scores;
pub mod server;

use std::env;
use std::str::FromStr;

pub use scores::{CacheConfig, ScoresConfig};

use crate::error::AppError;

/// Get required environment variable or return error
pub(crate) fn must_var(name: &str) -> Result<String, AppError> {
    env::var(name)
        .map_err(|_| AppError::config(format!("Required environment variable '{name}' is not set")))
}

/// Parse an optional environment variable, falling back to `default` when unset.
pub(crate) fn var_or<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| AppError::config(format!("Invalid value for '{name}': {raw:?} ({e})"))),
        Err(_) => Ok(default),
    }
}

/// Accepts `true/false`, `1/0`, `yes/no` and `on/off`.
pub(crate) fn flag_or(name: &str, default: bool) -> Result<bool, AppError> {
    let Ok(raw) = env::var(name) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(AppError::config(format!(
            "Invalid boolean for '{name}': {other:?}"
        ))),
    }
}
