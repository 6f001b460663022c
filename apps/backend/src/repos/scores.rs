//! Score store: authoritative source of leaderboard rows.

use async_trait::async_trait;

use crate::domain::{RankedRuleset, RankingOrder, ScoreRow};
use crate::errors::domain::DomainError;

/// Audience restriction applied on top of map + mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreFilter {
    All,
    Mods(u32),
    /// Friends of the given user, plus the user themself.
    Friends(i64),
    Country(String),
}

/// Everything that selects one leaderboard's rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreQuery {
    pub map_hash: String,
    pub ruleset: RankedRuleset,
    pub filter: ScoreFilter,
    pub order: RankingOrder,
}

/// Queries only ever see completed scores of unrestricted users.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Top `limit` rows, best first.
    async fn query_page(&self, query: &ScoreQuery, limit: usize)
        -> Result<Vec<ScoreRow>, DomainError>;

    /// Uncapped number of rows matching `query`.
    async fn count_matching(&self, query: &ScoreQuery) -> Result<u64, DomainError>;

    /// The user's best row under `query`'s filter and ordering.
    async fn query_user_best(
        &self,
        query: &ScoreQuery,
        user_id: i64,
    ) -> Result<Option<ScoreRow>, DomainError>;

    /// Rows whose ordering column is strictly greater than `value`.
    async fn count_outranking(&self, query: &ScoreQuery, value: f64) -> Result<u64, DomainError>;
}
