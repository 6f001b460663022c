use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::expiring::ExpiringBoundedCache;
use super::key::CacheKey;
use crate::domain::{LeaderboardPage, RankedRuleset};

pub type PageCache = ExpiringBoundedCache<CacheKey, Arc<LeaderboardPage>>;

/// One page cache per ranked ruleset.
///
/// Only `Global` and `ModFiltered` keys are ever stored; friends and country
/// views are recomputed on every request.
pub struct LeaderboardCacheSet {
    caches: [PageCache; RankedRuleset::COUNT],
}

impl LeaderboardCacheSet {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            caches: std::array::from_fn(|_| ExpiringBoundedCache::new(capacity, ttl)),
        }
    }

    pub fn cache_for(&self, ruleset: RankedRuleset) -> &PageCache {
        &self.caches[ruleset.index()]
    }

    pub fn get(&self, ruleset: RankedRuleset, key: &CacheKey) -> Option<Arc<LeaderboardPage>> {
        if !key.is_shared() {
            return None;
        }
        self.cache_for(ruleset).get(key)
    }

    /// Returns `false` when the key's scope is not cacheable.
    pub fn put(&self, ruleset: RankedRuleset, key: CacheKey, page: Arc<LeaderboardPage>) -> bool {
        if !key.is_shared() {
            warn!(%ruleset, scope = ?key.scope(), "refusing to cache per-requester leaderboard");
            return false;
        }
        let evicted = self.cache_for(ruleset).put(key, page);
        if evicted > 0 {
            debug!(%ruleset, evicted, "leaderboard cache maintenance");
        }
        true
    }

    /// Drop every page for `map_hash` in one ruleset, whatever its scope.
    pub fn evict_by_map_hash(&self, ruleset: RankedRuleset, map_hash: &str) -> usize {
        self.cache_for(ruleset)
            .remove_matching(|key| key.map_hash() == map_hash)
    }

    pub fn len(&self) -> usize {
        self.caches.iter().map(ExpiringBoundedCache::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
