use std::time::Duration;

use super::{flag_or, var_or};
use crate::domain::PAGE_CAP;
use crate::error::AppError;

/// Sizing of the process-local caches.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// When false every global/mod request is computed from storage.
    pub enabled: bool,
    pub page_ttl: Duration,
    /// Entries per ruleset page cache.
    pub page_capacity: usize,
    pub unranked_capacity: u64,
    pub unranked_ttl: Duration,
    pub best_slot_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            page_ttl: Duration::from_secs(120 * 60),
            page_capacity: 1000,
            unranked_capacity: 10_000,
            unranked_ttl: Duration::from_secs(60 * 60),
            best_slot_ttl: Duration::from_secs(1800),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoresConfig {
    pub cache: CacheConfig,
    /// Rows fetched per page query.
    pub page_cap: usize,
    /// Budget for all storage work of one leaderboard request.
    pub request_timeout: Duration,
    pub maintenance: bool,
}

impl Default for ScoresConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            page_cap: PAGE_CAP,
            request_timeout: Duration::from_millis(10_000),
            maintenance: false,
        }
    }
}

impl ScoresConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let cache = CacheConfig {
            enabled: flag_or("SCORES_CACHE_ENABLE", defaults.cache.enabled)?,
            page_ttl: minutes(positive("SCORES_CACHE_TTL_MINUTES", 120)?),
            page_capacity: positive("SCORES_CACHE_CAPACITY", defaults.cache.page_capacity as u64)?
                as usize,
            unranked_capacity: positive(
                "SCORES_UNRANKED_CACHE_CAPACITY",
                defaults.cache.unranked_capacity,
            )?,
            unranked_ttl: minutes(positive("SCORES_UNRANKED_CACHE_TTL_MINUTES", 60)?),
            best_slot_ttl: Duration::from_secs(positive("SCORES_BEST_SLOT_TTL_SECS", 1800)?),
        };

        Ok(Self {
            cache,
            page_cap: positive("SCORES_PAGE_CAP", defaults.page_cap as u64)? as usize,
            request_timeout: Duration::from_millis(positive("SCORES_REQUEST_TIMEOUT_MS", 10_000)?),
            maintenance: flag_or("SCORES_MAINTENANCE", defaults.maintenance)?,
        })
    }
}

fn minutes(n: u64) -> Duration {
    Duration::from_secs(n * 60)
}

fn positive(name: &str, default: u64) -> Result<u64, AppError> {
    let value = var_or(name, default)?;
    if value == 0 {
        return Err(AppError::config(format!("'{name}' must be greater than zero")));
    }
    Ok(value)
}
