//! Pipe-delimited leaderboard format understood by the game client.
//!
//! A response is `header`, then the personal-best line (empty when there is
//! none), then one line per score, joined with `\n`.

use crate::domain::{RankedStatus, RulesetVariant, ScoreRow};
use crate::repos::BeatmapInfo;

/// Served verbatim while the leaderboard is in maintenance mode.
pub const MAINTENANCE: &str = "999|Leaderboard Maintenence|0|0|0|0|0|0|0|0|0|0|999|0|0|1";

/// Header for a map that has no leaderboard to show.
pub fn status_only_header(status: RankedStatus) -> String {
    format!("{status}|false")
}

/// `status|false|mapID|setID|total`, the rating offset, display name and rating.
pub fn beatmap_header(info: &BeatmapInfo, total_count: u64) -> String {
    format!(
        "{}|false|{}|{}|{}\n0\n{}\n{:?}",
        info.ranked_status, info.map_id, info.set_id, total_count, info.display_name, info.rating
    )
}

/// One score line annotated with its 1-based board position.
pub fn format_score(row: &ScoreRow, rank: u64, variant: RulesetVariant) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|1",
        row.id,
        row.user_id,
        row.metric(variant),
        row.max_combo,
        row.count_50,
        row.count_100,
        row.count_300,
        row.count_miss,
        row.count_katu,
        row.count_geki,
        u8::from(row.full_combo),
        row.mods,
        row.time,
        rank,
        row.pp.round() as i64,
    )
}

/// Join header, optional personal-best line and score lines.
pub fn render_leaderboard<I>(header: &str, personal_best: Option<&str>, rows: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut lines = vec![header.to_string(), personal_best.unwrap_or_default().to_string()];
    lines.extend(rows);
    lines.join("\n")
}
