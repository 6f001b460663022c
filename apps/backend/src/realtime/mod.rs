pub mod invalidation;

pub use invalidation::{BeatmapUpdate, CHANNEL};
