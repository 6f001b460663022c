//! SeaORM implementations of the collaborator interfaces.

pub mod beatmaps_sea;
pub mod scores_sea;
pub mod users_sea;

pub use beatmaps_sea::SeaBeatmapResolver;
pub use scores_sea::SeaScoreStore;
pub use users_sea::SeaUserDirectory;
