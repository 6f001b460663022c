//! Row shapes decoded from score queries.

use sea_orm::FromQueryResult;

use crate::domain::ScoreRow;

/// One joined `scores`/`scores_relax` + `users` row.
#[derive(Debug, Clone, FromQueryResult)]
pub struct ScoreRowDto {
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
    pub mods: i64,
    pub time: i64,
    pub username: String,
    pub user_id: i64,
}

impl From<ScoreRowDto> for ScoreRow {
    fn from(dto: ScoreRowDto) -> Self {
        Self {
            id: dto.id,
            score: dto.score,
            pp: dto.pp,
            max_combo: dto.max_combo,
            count_50: dto.count_50,
            count_100: dto.count_100,
            count_300: dto.count_300,
            count_geki: dto.count_geki,
            count_katu: dto.count_katu,
            count_miss: dto.count_miss,
            full_combo: dto.full_combo,
            mods: u32::try_from(dto.mods).unwrap_or_default(),
            time: dto.time,
            username: dto.username,
            user_id: dto.user_id,
        }
    }
}

#[derive(Debug, Clone, Copy, FromQueryResult)]
pub struct CountDto {
    pub total: i64,
}
