//! Single-slot-per-user personal-best rank shared across processes.
//!
//! The slot remembers the last rank resolved for a user together with the
//! context it was resolved in and when. A read only counts as a hit when the
//! stored context matches the request exactly; callers compare the resolve
//! time against the map's last invalidation.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::time::Instant;
use tracing::debug;

use crate::domain::RankingOrder;
use crate::errors::domain::{DomainError, InfraErrorKind};

/// Request context a slot value is only valid for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotContext {
    pub map_hash: String,
    /// Ruleset label such as `vn_std`.
    pub ruleset: String,
    /// Follows the map's ranked status, so a status change misses.
    pub order: RankingOrder,
    pub country: bool,
    pub friends: bool,
    /// Mods filter, or `-1` when the board is not mod-filtered.
    pub mods: i64,
}

/// A rank and the wall-clock millis its resolution started at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotEntry {
    pub rank: u64,
    pub resolved_at_ms: u64,
}

impl SlotContext {
    fn encode(&self, entry: SlotEntry) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}|{}|{}",
            entry.rank,
            entry.resolved_at_ms,
            self.map_hash,
            self.ruleset,
            self.order.column(),
            self.country,
            self.friends,
            self.mods
        )
    }

    /// Entry stored in `raw` if it was written for this exact context.
    fn decode_match(&self, raw: &str) -> Option<SlotEntry> {
        let mut parts = raw.split('|');
        let rank = parts.next()?.parse::<u64>().ok()?;
        let resolved_at_ms = parts.next()?.parse::<u64>().ok()?;
        let map_hash = parts.next()?;
        let ruleset = parts.next()?;
        let order = parts.next()?;
        let country = parts.next()?.parse::<bool>().ok()?;
        let friends = parts.next()?.parse::<bool>().ok()?;
        let mods = parts.next()?.parse::<i64>().ok()?;
        if parts.next().is_some() {
            return None;
        }
        let matches = map_hash == self.map_hash
            && ruleset == self.ruleset
            && order == self.order.column()
            && country == self.country
            && friends == self.friends
            && mods == self.mods;
        matches.then_some(SlotEntry {
            rank,
            resolved_at_ms,
        })
    }
}

#[async_trait]
pub trait CrossProcessBestSlot: Send + Sync {
    /// Entry for `user_id` if the slot holds one for this exact context.
    async fn get(
        &self,
        user_id: i64,
        ctx: &SlotContext,
    ) -> Result<Option<SlotEntry>, DomainError>;

    /// Overwrite the user's slot unconditionally.
    async fn set(
        &self,
        user_id: i64,
        entry: SlotEntry,
        ctx: &SlotContext,
        ttl: Duration,
    ) -> Result<(), DomainError>;
}

pub struct RedisBestSlot {
    conn: ConnectionManager,
}

impl RedisBestSlot {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn key(user_id: i64) -> String {
        format!("scores:personal_best:{user_id}")
    }
}

fn redis_err(err: redis::RedisError) -> DomainError {
    DomainError::infra(
        InfraErrorKind::CacheUnavailable,
        format!("personal best slot: {err}"),
    )
}

#[async_trait]
impl CrossProcessBestSlot for RedisBestSlot {
    async fn get(
        &self,
        user_id: i64,
        ctx: &SlotContext,
    ) -> Result<Option<SlotEntry>, DomainError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(Self::key(user_id)).await.map_err(redis_err)?;
        let entry = raw.as_deref().and_then(|raw| ctx.decode_match(raw));
        if raw.is_some() && entry.is_none() {
            debug!(user_id, map_hash = %ctx.map_hash, "personal best slot context mismatch");
        }
        Ok(entry)
    }

    async fn set(
        &self,
        user_id: i64,
        entry: SlotEntry,
        ctx: &SlotContext,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(Self::key(user_id), ctx.encode(entry), ttl.as_secs().max(1))
            .await
            .map_err(redis_err)
    }
}

/// In-process slot for single-node deployments and tests.
#[derive(Default)]
pub struct MemoryBestSlot {
    slots: DashMap<i64, (String, Instant)>,
}

impl MemoryBestSlot {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CrossProcessBestSlot for MemoryBestSlot {
    async fn get(
        &self,
        user_id: i64,
        ctx: &SlotContext,
    ) -> Result<Option<SlotEntry>, DomainError> {
        let now = Instant::now();
        let entry = self
            .slots
            .get(&user_id)
            .filter(|slot| now < slot.1)
            .and_then(|slot| ctx.decode_match(&slot.0));
        Ok(entry)
    }

    async fn set(
        &self,
        user_id: i64,
        entry: SlotEntry,
        ctx: &SlotContext,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        self.slots
            .insert(user_id, (ctx.encode(entry), Instant::now() + ttl));
        Ok(())
    }
}
