use std::env;

use super::var_or;
use crate::error::AppError;

/// HTTP bind address from `SCORES_HOST` / `SCORES_PORT`.
pub fn bind_addr() -> Result<(String, u16), AppError> {
    let host = env::var("SCORES_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = var_or::<u16>("SCORES_PORT", 5002)?;
    Ok((host, port))
}
