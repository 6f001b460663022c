use sea_orm::entity::prelude::*;

/// Catalogue row for one beatmap difficulty.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "beatmaps")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub beatmap_id: i64,
    pub beatmapset_id: i64,
    pub beatmap_md5: String,
    pub song_name: String,
    /// Client ranked-status integer.
    pub ranked: i32,
    pub rating: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
