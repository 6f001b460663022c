//! In-process caches behind the leaderboard engine.

pub mod best_slot;
pub mod epoch;
pub mod expiring;
pub mod key;
pub mod leaderboard;
pub mod personal_best;
pub mod unranked;

use tracing::info;

pub use best_slot::{CrossProcessBestSlot, MemoryBestSlot, RedisBestSlot, SlotContext, SlotEntry};
pub use epoch::{MapEpoch, MapEpochs};
pub use expiring::ExpiringBoundedCache;
pub use key::CacheKey;
pub use leaderboard::LeaderboardCacheSet;
pub use personal_best::{PersonalBest, PersonalBestIndex};
pub use unranked::UnrankedMapCache;

use crate::config::CacheConfig;
use crate::domain::RankedRuleset;

/// What an invalidation removed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InvalidationReport {
    pub pages: usize,
    pub personal_bests: usize,
}

/// Every process-local cache the engine owns.
pub struct LeaderboardCaches {
    pub pages: LeaderboardCacheSet,
    pub personal_bests: PersonalBestIndex,
    pub unranked: UnrankedMapCache,
    pub epochs: MapEpochs,
}

impl LeaderboardCaches {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            pages: LeaderboardCacheSet::new(config.page_capacity, config.page_ttl),
            personal_bests: PersonalBestIndex::new(),
            unranked: UnrankedMapCache::new(config.unranked_capacity, config.unranked_ttl),
            epochs: MapEpochs::new(),
        }
    }

    /// Evict everything derived from `map_hash` in all seven rulesets and
    /// advance its epoch, so in-flight requests cannot put stale results back.
    pub async fn invalidate_map(&self, map_hash: &str) -> InvalidationReport {
        let report = self.epochs.advance(map_hash, || {
            let mut report = InvalidationReport::default();
            for ruleset in RankedRuleset::all() {
                report.pages += self.pages.evict_by_map_hash(ruleset, map_hash);
                report.personal_bests += self.personal_bests.delete_all_for_map(ruleset, map_hash);
            }
            report
        });
        self.unranked.invalidate(map_hash).await;

        info!(
            map_hash,
            pages = report.pages,
            personal_bests = report.personal_bests,
            "leaderboard caches invalidated"
        );
        report
    }
}
