//! Collaborator interfaces the leaderboard engine depends on.

pub mod beatmaps;
pub mod scores;
pub mod users;

pub use beatmaps::{BeatmapInfo, BeatmapResolver, BeatmapSelector};
pub use scores::{ScoreFilter, ScoreQuery, ScoreStore};
pub use users::{Requester, UserDirectory};
