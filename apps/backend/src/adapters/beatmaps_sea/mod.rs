//! SeaORM adapter for the beatmap catalogue.

use async_trait::async_trait;
use lazy_regex::regex_captures;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect};
use tracing::debug;

use crate::domain::RankedStatus;
use crate::entities::beatmaps;
use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::repos::beatmaps::{BeatmapInfo, BeatmapResolver, BeatmapSelector};

pub async fn find_by_hash<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    map_hash: &str,
) -> Result<Option<beatmaps::Model>, DbErr> {
    beatmaps::Entity::find()
        .filter(beatmaps::Column::BeatmapMd5.eq(map_hash))
        .one(conn)
        .await
}

pub async fn song_exists<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    song_name: &str,
) -> Result<bool, DbErr> {
    let found = beatmaps::Entity::find()
        .filter(beatmaps::Column::SongName.eq(song_name))
        .one(conn)
        .await?;
    Ok(found.is_some())
}

pub async fn hashes_for<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    selector: BeatmapSelector,
) -> Result<Vec<String>, DbErr> {
    let filter = match selector {
        BeatmapSelector::Map(id) => beatmaps::Column::BeatmapId.eq(id),
        BeatmapSelector::Set(id) => beatmaps::Column::BeatmapsetId.eq(id),
    };
    beatmaps::Entity::find()
        .select_only()
        .column(beatmaps::Column::BeatmapMd5)
        .filter(filter)
        .into_tuple::<String>()
        .all(conn)
        .await
}

/// "Artist - Title (Creator) [Version].osu" -> "Artist - Title [Version]".
///
/// The catalogue stores song names without the creator.
pub fn song_name_from_file(file_name: &str) -> Option<String> {
    let (_, artist, title, _creator, version) =
        regex_captures!(r"^(.+) - (.+) \((.+)\) \[(.+)\]\.osu$", file_name)?;
    Some(format!("{artist} - {title} [{version}]"))
}

fn info_from_model(model: beatmaps::Model) -> Result<BeatmapInfo, DomainError> {
    let ranked_status = RankedStatus::from_id(model.ranked).ok_or_else(|| {
        DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!("beatmap {} has unknown ranked status {}", model.beatmap_id, model.ranked),
        )
    })?;
    Ok(BeatmapInfo {
        map_hash: model.beatmap_md5,
        map_id: model.beatmap_id,
        set_id: model.beatmapset_id,
        ranked_status,
        display_name: model.song_name,
        rating: model.rating,
    })
}

/// `BeatmapResolver` over the local catalogue tables.
#[derive(Clone)]
pub struct SeaBeatmapResolver {
    db: DatabaseConnection,
}

impl SeaBeatmapResolver {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BeatmapResolver for SeaBeatmapResolver {
    async fn resolve(
        &self,
        map_hash: &str,
        _set_id: i64,
        file_name: &str,
    ) -> Result<BeatmapInfo, DomainError> {
        if let Some(model) = find_by_hash(&self.db, map_hash).await? {
            return info_from_model(model);
        }

        let Some(song_name) = song_name_from_file(file_name) else {
            debug!(map_hash, file_name, "unknown beatmap without a usable file name");
            return Ok(BeatmapInfo::unknown(map_hash, RankedStatus::NotSubmitted));
        };

        let status = if song_exists(&self.db, &song_name).await? {
            RankedStatus::NeedUpdate
        } else {
            RankedStatus::NotSubmitted
        };
        Ok(BeatmapInfo::unknown(map_hash, status))
    }

    async fn map_hashes(&self, selector: BeatmapSelector) -> Result<Vec<String>, DomainError> {
        Ok(hashes_for(&self.db, selector).await?)
    }
}
