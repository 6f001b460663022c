//! Leaderboard domain types: modes, rulesets, ranking states, scopes and pages.

pub mod mode;
pub mod ranked;
pub mod scope;
pub mod score;

pub use mode::{mods, GameMode, RankedRuleset, RulesetVariant};
pub use ranked::RankedStatus;
pub use scope::{privileges, LeaderboardScope, PrivilegeTier};
pub use score::{LeaderboardPage, RankingOrder, ScoreRow, PAGE_CAP};
