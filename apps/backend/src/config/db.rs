use std::env;

use super::{must_var, var_or};
use crate::error::AppError;

/// Score database (MySQL) URL built from `DB_*` variables.
pub fn db_url() -> Result<String, AppError> {
    let host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = var_or::<u16>("DB_PORT", 3306)?;
    let db_name = must_var("DB_NAME")?;
    let username = must_var("DB_USER")?;
    let password = must_var("DB_PASSWORD")?;

    Ok(format!(
        "mysql://{username}:{password}@{host}:{port}/{db_name}"
    ))
}

/// Pool size bounding concurrent storage queries.
pub fn max_connections() -> Result<u32, AppError> {
    let default = (num_cpus::get() as u32).saturating_mul(4).max(4);
    let n = var_or("DB_MAX_CONNECTIONS", default)?;
    if n == 0 {
        return Err(AppError::config("'DB_MAX_CONNECTIONS' must be greater than zero"));
    }
    Ok(n)
}
