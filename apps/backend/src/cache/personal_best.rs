use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;

use crate::domain::{RankedRuleset, ScoreRow};

/// A resolved personal best: the row and its 1-based rank on the board.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonalBest {
    pub rank: u64,
    pub row: ScoreRow,
}

type MapBucket = HashMap<i64, Arc<PersonalBest>>;

/// ruleset -> map hash -> user -> personal best.
///
/// Entries have no TTL; they live until the map is invalidated or the user's
/// entry is deleted.
pub struct PersonalBestIndex {
    maps: [DashMap<String, MapBucket>; RankedRuleset::COUNT],
}

impl PersonalBestIndex {
    pub fn new() -> Self {
        Self {
            maps: std::array::from_fn(|_| DashMap::new()),
        }
    }

    pub fn get(
        &self,
        ruleset: RankedRuleset,
        user_id: i64,
        map_hash: &str,
    ) -> Option<Arc<PersonalBest>> {
        self.maps[ruleset.index()]
            .get(map_hash)
            .and_then(|bucket| bucket.get(&user_id).cloned())
    }

    /// First writer wins: an existing entry for the same key is kept and
    /// returned instead.
    pub fn set(
        &self,
        ruleset: RankedRuleset,
        user_id: i64,
        map_hash: &str,
        best: PersonalBest,
    ) -> Arc<PersonalBest> {
        let mut bucket = self.maps[ruleset.index()]
            .entry(map_hash.to_string())
            .or_default();
        bucket
            .entry(user_id)
            .or_insert_with(|| Arc::new(best))
            .clone()
    }

    pub fn delete_for_user(&self, ruleset: RankedRuleset, user_id: i64, map_hash: &str) -> bool {
        let maps = &self.maps[ruleset.index()];
        let removed = match maps.get_mut(map_hash) {
            Some(mut bucket) => bucket.remove(&user_id).is_some(),
            None => return false,
        };
        maps.remove_if(map_hash, |_, bucket| bucket.is_empty());
        removed
    }

    /// Drop the whole per-map bucket. Returns how many users it held.
    pub fn delete_all_for_map(&self, ruleset: RankedRuleset, map_hash: &str) -> usize {
        self.maps[ruleset.index()]
            .remove(map_hash)
            .map(|(_, bucket)| bucket.len())
            .unwrap_or(0)
    }
}

impl Default for PersonalBestIndex {
    fn default() -> Self {
        Self::new()
    }
}
