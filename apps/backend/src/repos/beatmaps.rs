//! Beatmap resolver: identity and ranking state of a map difficulty.

use async_trait::async_trait;

use crate::domain::RankedStatus;
use crate::errors::domain::DomainError;

#[derive(Debug, Clone, PartialEq)]
pub struct BeatmapInfo {
    pub map_hash: String,
    pub map_id: i64,
    pub set_id: i64,
    pub ranked_status: RankedStatus,
    /// "Artist - Title [Version]"
    pub display_name: String,
    pub rating: f64,
}

impl BeatmapInfo {
    /// Placeholder for a hash the catalogue has never seen.
    pub fn unknown(map_hash: &str, status: RankedStatus) -> Self {
        Self {
            map_hash: map_hash.to_string(),
            map_id: 0,
            set_id: 0,
            ranked_status: status,
            display_name: String::new(),
            rating: 10.0,
        }
    }
}

/// Which maps a beatmap-update notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeatmapSelector {
    Map(i64),
    Set(i64),
}

#[async_trait]
pub trait BeatmapResolver: Send + Sync {
    /// Unknown hashes resolve to `NotSubmitted`, or `NeedUpdate` when the
    /// file name matches a map the catalogue knows under a newer hash.
    async fn resolve(
        &self,
        map_hash: &str,
        set_id: i64,
        file_name: &str,
    ) -> Result<BeatmapInfo, DomainError>;

    /// Current hashes of the selected maps.
    async fn map_hashes(&self, selector: BeatmapSelector) -> Result<Vec<String>, DomainError>;
}
