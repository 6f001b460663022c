//! Splitting leaderboard response bodies for assertions.

/// A leaderboard body broken into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireResponse {
    /// `status|false|mapID|setID|total`, or just `status|false`.
    pub status_line: String,
    /// Display name and rating lines; empty for status-only bodies.
    pub beatmap_lines: Vec<String>,
    /// `None` when the personal-best line is empty or absent.
    pub personal_best: Option<String>,
    pub rows: Vec<String>,
}

impl WireResponse {
    /// The `total` field of the status line, if present.
    pub fn total_count(&self) -> Option<u64> {
        self.status_line.split('|').nth(4)?.parse().ok()
    }

    /// User ids of the rendered rows, in order.
    pub fn row_user_ids(&self) -> Vec<i64> {
        self.rows.iter().filter_map(|row| field(row, 1)).collect()
    }

    /// `(user_id, rank)` of the personal-best line.
    pub fn personal_best_rank(&self) -> Option<(i64, u64)> {
        let line = self.personal_best.as_deref()?;
        Some((field(line, 1)?, field(line, 13)?))
    }
}

fn field<T: std::str::FromStr>(line: &str, index: usize) -> Option<T> {
    line.split('|').nth(index)?.parse().ok()
}

/// Split `body` into header, personal best and rows.
///
/// A full body has four header lines (status, rating offset, display name,
/// rating) followed by the personal-best line and one line per score.
pub fn split_response(body: &str) -> WireResponse {
    let lines: Vec<&str> = body.split('\n').collect();
    let status_line = lines.first().copied().unwrap_or_default().to_string();

    if lines.len() <= 1 {
        return WireResponse {
            status_line,
            beatmap_lines: Vec::new(),
            personal_best: None,
            rows: Vec::new(),
        };
    }

    let beatmap_lines = lines
        .iter()
        .skip(1)
        .take(3)
        .map(|line| line.to_string())
        .collect();
    let personal_best = lines
        .get(4)
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string());
    let rows = lines
        .iter()
        .skip(5)
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect();

    WireResponse {
        status_line,
        beatmap_lines,
        personal_best,
        rows,
    }
}
