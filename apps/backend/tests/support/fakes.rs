//! In-memory collaborators that count every storage call.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use scoreboard::cache::{
    CrossProcessBestSlot, LeaderboardCaches, MemoryBestSlot, SlotContext, SlotEntry,
};
use scoreboard::config::ScoresConfig;
use scoreboard::domain::{privileges, GameMode, LeaderboardScope, RankedRuleset, RankedStatus, ScoreRow};
use scoreboard::errors::domain::{DomainError, InfraErrorKind};
use scoreboard::repos::{
    BeatmapInfo, BeatmapResolver, BeatmapSelector, Requester, ScoreFilter, ScoreQuery, ScoreStore,
    UserDirectory,
};
use scoreboard::services::{LeaderboardRequest, ScoreRetrievalEngine};

pub const MAP: &str = "d7e1002824cb188bf318326aa109469d";
pub const COUNTRY: &str = "JP";

#[derive(Debug, Clone)]
struct StoredScore {
    map_hash: String,
    ruleset: RankedRuleset,
    row: ScoreRow,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StoreCalls {
    pub pages: usize,
    pub counts: usize,
    pub user_bests: usize,
    pub outranking: usize,
}

impl StoreCalls {
    pub fn total(&self) -> usize {
        self.pages + self.counts + self.user_bests + self.outranking
    }
}

/// Score store over a vector, applying the same filters and ordering as SQL.
#[derive(Default)]
pub struct FakeScoreStore {
    scores: Mutex<Vec<StoredScore>>,
    friends: Mutex<HashSet<(i64, i64)>>,
    countries: Mutex<HashMap<i64, String>>,
    pages: AtomicUsize,
    counts: AtomicUsize,
    user_bests: AtomicUsize,
    outranking: AtomicUsize,
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl FakeScoreStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, map_hash: &str, ruleset: RankedRuleset, row: ScoreRow) {
        self.scores.lock().push(StoredScore {
            map_hash: map_hash.to_string(),
            ruleset,
            row,
        });
    }

    /// `user_id` lists `friend_id` as a friend.
    pub fn befriend(&self, user_id: i64, friend_id: i64) {
        self.friends.lock().insert((user_id, friend_id));
    }

    pub fn set_country(&self, user_id: i64, country: &str) {
        self.countries.lock().insert(user_id, country.to_string());
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn calls(&self) -> StoreCalls {
        StoreCalls {
            pages: self.pages.load(Ordering::SeqCst),
            counts: self.counts.load(Ordering::SeqCst),
            user_bests: self.user_bests.load(Ordering::SeqCst),
            outranking: self.outranking.load(Ordering::SeqCst),
        }
    }

    async fn enter(&self, counter: &AtomicUsize) -> Result<(), DomainError> {
        counter.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::infra(
                InfraErrorKind::DbUnavailable,
                "connection refused",
            ));
        }
        Ok(())
    }

    fn matching(&self, query: &ScoreQuery) -> Vec<ScoreRow> {
        let friends = self.friends.lock();
        let countries = self.countries.lock();
        let mut rows: Vec<ScoreRow> = self
            .scores
            .lock()
            .iter()
            .filter(|s| s.map_hash == query.map_hash && s.ruleset == query.ruleset)
            .filter(|s| match &query.filter {
                ScoreFilter::All => true,
                ScoreFilter::Mods(mods) => s.row.mods == *mods,
                ScoreFilter::Friends(me) => {
                    s.row.user_id == *me || friends.contains(&(*me, s.row.user_id))
                }
                ScoreFilter::Country(code) => countries.get(&s.row.user_id) == Some(code),
            })
            .map(|s| s.row.clone())
            .collect();
        rows.sort_by(|a, b| {
            query
                .order
                .value_of(b)
                .total_cmp(&query.order.value_of(a))
                .then(a.id.cmp(&b.id))
        });
        rows
    }
}

#[async_trait]
impl ScoreStore for FakeScoreStore {
    async fn query_page(&self, query: &ScoreQuery, limit: usize) -> Result<Vec<ScoreRow>, DomainError> {
        self.enter(&self.pages).await?;
        Ok(self.matching(query).into_iter().take(limit).collect())
    }

    async fn count_matching(&self, query: &ScoreQuery) -> Result<u64, DomainError> {
        self.enter(&self.counts).await?;
        Ok(self.matching(query).len() as u64)
    }

    async fn query_user_best(
        &self,
        query: &ScoreQuery,
        user_id: i64,
    ) -> Result<Option<ScoreRow>, DomainError> {
        self.enter(&self.user_bests).await?;
        Ok(self.matching(query).into_iter().find(|row| row.user_id == user_id))
    }

    async fn count_outranking(&self, query: &ScoreQuery, value: f64) -> Result<u64, DomainError> {
        self.enter(&self.outranking).await?;
        let above = self
            .matching(query)
            .iter()
            .filter(|row| query.order.value_of(row) > value)
            .count();
        Ok(above as u64)
    }
}

/// Catalogue keyed by hash; unknown hashes are unsubmitted.
#[derive(Default)]
pub struct FakeBeatmaps {
    maps: Mutex<HashMap<String, BeatmapInfo>>,
    resolves: AtomicUsize,
}

impl FakeBeatmaps {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add(&self, map_hash: &str, map_id: i64, set_id: i64, status: RankedStatus) {
        self.maps.lock().insert(
            map_hash.to_string(),
            BeatmapInfo {
                map_hash: map_hash.to_string(),
                map_id,
                set_id,
                ranked_status: status,
                display_name: "Kenji Ninuma - DISCO PRINCE [Normal]".to_string(),
                rating: 10.0,
            },
        );
    }

    pub fn set_status(&self, map_hash: &str, status: RankedStatus) {
        if let Some(info) = self.maps.lock().get_mut(map_hash) {
            info.ranked_status = status;
        }
    }

    pub fn resolves(&self) -> usize {
        self.resolves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BeatmapResolver for FakeBeatmaps {
    async fn resolve(
        &self,
        map_hash: &str,
        _set_id: i64,
        _file_name: &str,
    ) -> Result<BeatmapInfo, DomainError> {
        self.resolves.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .maps
            .lock()
            .get(map_hash)
            .cloned()
            .unwrap_or_else(|| BeatmapInfo::unknown(map_hash, RankedStatus::NotSubmitted)))
    }

    async fn map_hashes(&self, selector: BeatmapSelector) -> Result<Vec<String>, DomainError> {
        let mut hashes: Vec<String> = self
            .maps
            .lock()
            .values()
            .filter(|info| match selector {
                BeatmapSelector::Map(id) => info.map_id == id,
                BeatmapSelector::Set(id) => info.set_id == id,
            })
            .map(|info| info.map_hash.clone())
            .collect();
        hashes.sort();
        Ok(hashes)
    }
}

/// Users with plain-text password hashes.
#[derive(Default)]
pub struct FakeUsers {
    users: Mutex<HashMap<String, (Requester, String)>>,
}

impl FakeUsers {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add(&self, requester: Requester, password_md5: &str) {
        self.users.lock().insert(
            requester.username.to_lowercase(),
            (requester, password_md5.to_string()),
        );
    }
}

#[async_trait]
impl UserDirectory for FakeUsers {
    async fn find_by_username(&self, username: &str) -> Result<Option<Requester>, DomainError> {
        Ok(self
            .users
            .lock()
            .get(&username.to_lowercase())
            .map(|(requester, _)| requester.clone()))
    }

    async fn verify_password(&self, user_id: i64, password_md5: &str) -> Result<bool, DomainError> {
        Ok(self
            .users
            .lock()
            .values()
            .any(|(requester, password)| requester.user_id == user_id && password == password_md5))
    }
}

/// Slot whose backend is always down.
pub struct UnavailableSlot;

#[async_trait]
impl CrossProcessBestSlot for UnavailableSlot {
    async fn get(
        &self,
        _user_id: i64,
        _ctx: &SlotContext,
    ) -> Result<Option<SlotEntry>, DomainError> {
        Err(DomainError::infra(InfraErrorKind::CacheUnavailable, "redis down"))
    }

    async fn set(
        &self,
        _user_id: i64,
        _entry: SlotEntry,
        _ctx: &SlotContext,
        _ttl: Duration,
    ) -> Result<(), DomainError> {
        Err(DomainError::infra(InfraErrorKind::CacheUnavailable, "redis down"))
    }
}

pub fn score(id: i64, user_id: i64, score: i64, pp: f64) -> ScoreRow {
    ScoreRow {
        id,
        score,
        pp,
        max_combo: 700,
        count_50: 0,
        count_100: 3,
        count_300: 650,
        count_geki: 120,
        count_katu: 2,
        count_miss: 0,
        full_combo: true,
        mods: 0,
        time: 1_700_000_000 + id,
        username: format!("player{user_id}"),
        user_id,
    }
}

pub fn requester(user_id: i64) -> Requester {
    Requester {
        user_id,
        username: format!("player{user_id}"),
        privileges: privileges::USER_PUBLIC | privileges::USER_NORMAL,
        country: COUNTRY.to_string(),
    }
}

pub fn request(scope: LeaderboardScope, user_id: i64) -> LeaderboardRequest {
    LeaderboardRequest {
        map_hash: MAP.to_string(),
        set_id: 1,
        file_name: "Kenji Ninuma - DISCO PRINCE (peppy) [Normal].osu".to_string(),
        mode: GameMode::Standard,
        mods: 0,
        scope,
        requester: requester(user_id),
    }
}

pub fn vanilla_std() -> RankedRuleset {
    RankedRuleset::all()[0]
}

/// Engine plus handles on its fakes.
pub struct Harness {
    pub engine: Arc<ScoreRetrievalEngine>,
    pub store: Arc<FakeScoreStore>,
    pub beatmaps: Arc<FakeBeatmaps>,
}

impl Harness {
    pub fn new(config: ScoresConfig) -> Self {
        Self::with_slot(config, Arc::new(MemoryBestSlot::new()))
    }

    pub fn with_slot(config: ScoresConfig, slot: Arc<dyn CrossProcessBestSlot>) -> Self {
        let store = FakeScoreStore::new();
        let beatmaps = FakeBeatmaps::new();
        beatmaps.add(MAP, 75, 1, RankedStatus::Ranked);
        let caches = Arc::new(LeaderboardCaches::new(&config.cache));
        let engine = Arc::new(ScoreRetrievalEngine::new(
            store.clone(),
            beatmaps.clone(),
            slot,
            caches,
            config,
        ));
        Self {
            engine,
            store,
            beatmaps,
        }
    }

    /// `n` scores on the default map, user ids `1..=n`, best first.
    pub fn seed(&self, n: i64) {
        for i in 1..=n {
            self.store.insert(
                MAP,
                vanilla_std(),
                score(i, i, 1_000_000 - i, 1000.0 - i as f64),
            );
        }
    }
}
