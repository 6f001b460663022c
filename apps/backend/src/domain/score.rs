//! Read-only score snapshots and the pages they are grouped into.

use super::mode::RulesetVariant;
use super::ranked::RankedStatus;

/// Rows fetched from storage for one leaderboard page.
pub const PAGE_CAP: usize = 500;

/// Immutable copy of one submitted score, joined with its owner.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRow {
    pub id: i64,
    pub score: i64,
    pub pp: f64,
    pub max_combo: i32,
    pub count_50: i32,
    pub count_100: i32,
    pub count_300: i32,
    pub count_geki: i32,
    pub count_katu: i32,
    pub count_miss: i32,
    pub full_combo: bool,
    pub mods: u32,
    /// Unix timestamp of submission.
    pub time: i64,
    pub username: String,
    pub user_id: i64,
}

impl ScoreRow {
    /// The number shown in the client's score column.
    pub fn metric(&self, variant: RulesetVariant) -> i64 {
        match variant {
            RulesetVariant::Vanilla => self.score,
            RulesetVariant::Relax => self.pp.round() as i64,
        }
    }
}

/// Column a leaderboard is sorted on (descending).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingOrder {
    Pp,
    Score,
}

impl RankingOrder {
    pub fn for_status(status: RankedStatus) -> Self {
        if status.ranks_by_pp() {
            RankingOrder::Pp
        } else {
            RankingOrder::Score
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            RankingOrder::Pp => "pp",
            RankingOrder::Score => "score",
        }
    }

    pub fn value_of(self, row: &ScoreRow) -> f64 {
        match self {
            RankingOrder::Pp => row.pp,
            RankingOrder::Score => row.score as f64,
        }
    }
}

/// One computed leaderboard view.
///
/// `total_count` is the true number of matching scores even when `rows`
/// stopped at the page cap; `truncated` records that the cap was hit.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardPage {
    pub total_count: u64,
    pub rows: Vec<ScoreRow>,
    pub truncated: bool,
}

impl LeaderboardPage {
    /// Build a page from a capped query result.
    ///
    /// `total_count` is clamped up to the row count, so a stale or racing
    /// count can never report fewer scores than the page holds.
    pub fn new(rows: Vec<ScoreRow>, total_count: u64, page_cap: usize) -> Self {
        let truncated = rows.len() == page_cap;
        Self {
            total_count: total_count.max(rows.len() as u64),
            rows,
            truncated,
        }
    }

    pub fn empty() -> Self {
        Self {
            total_count: 0,
            rows: Vec::new(),
            truncated: false,
        }
    }

    /// Zero-based index of the first row owned by `user_id`.
    pub fn position_of(&self, user_id: i64) -> Option<usize> {
        self.rows.iter().position(|row| row.user_id == user_id)
    }
}
