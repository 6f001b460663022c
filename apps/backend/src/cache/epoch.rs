//! Per-map invalidation epochs.
//!
//! Every invalidation of a map hash advances its epoch. Work that started
//! under an older epoch must not publish into the caches, and shared slot
//! values resolved before the last invalidation are ignored.

use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;

/// Invalidation state of one map hash. Maps never invalidated are at the
/// default epoch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MapEpoch {
    pub generation: u64,
    /// Wall-clock millis of the last invalidation, `0` when never invalidated.
    pub invalidated_at_ms: u64,
}

impl MapEpoch {
    /// Whether a value resolved at `resolved_at_ms` postdates the last
    /// invalidation. Values from the same millisecond are treated as stale.
    pub fn admits(&self, resolved_at_ms: u64) -> bool {
        resolved_at_ms > self.invalidated_at_ms
    }
}

#[derive(Default)]
pub struct MapEpochs {
    epochs: DashMap<String, MapEpoch>,
}

impl MapEpochs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self, map_hash: &str) -> MapEpoch {
        self.epochs
            .get(map_hash)
            .map(|epoch| *epoch)
            .unwrap_or_default()
    }

    /// Advance the epoch of `map_hash` and run `evict` before any publisher
    /// holding the old epoch can observe the change.
    pub fn advance<R>(&self, map_hash: &str, evict: impl FnOnce() -> R) -> R {
        let mut epoch = self.epochs.entry(map_hash.to_string()).or_default();
        epoch.generation += 1;
        epoch.invalidated_at_ms = unix_millis().max(epoch.invalidated_at_ms);
        evict()
    }

    /// Run `publish` only if `map_hash` is still at `observed`.
    ///
    /// The epoch stays locked while `publish` runs, so an invalidation either
    /// completes before the check or waits until the publish is done and then
    /// evicts what it wrote. `publish` must not touch the epochs.
    pub fn publish_if_current<R>(
        &self,
        map_hash: &str,
        observed: MapEpoch,
        publish: impl FnOnce() -> R,
    ) -> Option<R> {
        match self.epochs.get(map_hash) {
            Some(epoch) if *epoch == observed => Some(publish()),
            Some(_) => None,
            None if observed == MapEpoch::default() => Some(publish()),
            None => None,
        }
    }
}

pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
