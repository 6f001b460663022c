use crate::domain::LeaderboardScope;

/// Identity of one leaderboard view.
///
/// The variant tag is part of the identity: a `Global` and a `ModFiltered`
/// key for the same map never compare equal, even with mods `0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Global { map_hash: String },
    ModFiltered { map_hash: String, mods: u32 },
    Friends { map_hash: String, user_id: i64 },
    Country { map_hash: String, country: String },
}

impl CacheKey {
    pub fn global(map_hash: impl Into<String>) -> Self {
        CacheKey::Global {
            map_hash: map_hash.into(),
        }
    }

    pub fn mod_filtered(map_hash: impl Into<String>, mods: u32) -> Self {
        CacheKey::ModFiltered {
            map_hash: map_hash.into(),
            mods,
        }
    }

    pub fn map_hash(&self) -> &str {
        match self {
            CacheKey::Global { map_hash }
            | CacheKey::ModFiltered { map_hash, .. }
            | CacheKey::Friends { map_hash, .. }
            | CacheKey::Country { map_hash, .. } => map_hash,
        }
    }

    pub fn scope(&self) -> LeaderboardScope {
        match self {
            CacheKey::Global { .. } => LeaderboardScope::Global,
            CacheKey::ModFiltered { .. } => LeaderboardScope::ModFiltered,
            CacheKey::Friends { .. } => LeaderboardScope::Friends,
            CacheKey::Country { .. } => LeaderboardScope::Country,
        }
    }

    /// Whether pages under this key may live in the shared page caches.
    pub fn is_shared(&self) -> bool {
        self.scope().is_shared()
    }
}
