use super::must_var;
use crate::error::AppError;

/// Redis endpoint for the invalidation channel and the personal-best slot.
pub fn redis_url() -> Result<String, AppError> {
    let url = must_var("REDIS_URL")?;
    if !(url.starts_with("redis://") || url.starts_with("rediss://")) {
        return Err(AppError::config(format!(
            "REDIS_URL must use the redis:// or rediss:// scheme, got {url:?}"
        )));
    }
    Ok(url)
}
