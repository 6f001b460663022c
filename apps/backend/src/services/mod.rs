pub mod leaderboard;

pub use leaderboard::{
    LeaderboardRequest, PageSource, PersonalBestSource, RenderedLeaderboard, ScoreRetrievalEngine,
};
