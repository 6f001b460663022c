use std::time::Duration;

use moka::future::Cache;

use crate::domain::RankedStatus;

/// Negative-result cache: map hashes known to have no leaderboard.
///
/// Bounded and time-limited so a large catalogue of unsubmitted maps cannot
/// grow it without limit, and so a later ranking is eventually noticed even
/// if the invalidation message is lost.
#[derive(Clone)]
pub struct UnrankedMapCache {
    inner: Cache<String, RankedStatus>,
}

impl UnrankedMapCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();
        Self { inner }
    }

    pub async fn get(&self, map_hash: &str) -> Option<RankedStatus> {
        self.inner.get(map_hash).await
    }

    /// Only statuses without a leaderboard are remembered.
    pub async fn remember(&self, map_hash: &str, status: RankedStatus) -> bool {
        if status.has_leaderboard() {
            return false;
        }
        self.inner.insert(map_hash.to_string(), status).await;
        true
    }

    pub async fn invalidate(&self, map_hash: &str) {
        self.inner.invalidate(map_hash).await;
    }
}
