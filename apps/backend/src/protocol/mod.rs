pub mod wire;

pub use wire::{beatmap_header, format_score, render_leaderboard, status_only_header, MAINTENANCE};
