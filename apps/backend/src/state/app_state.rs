use std::sync::Arc;

use crate::config::ScoresConfig;
use crate::repos::UserDirectory;
use crate::services::ScoreRetrievalEngine;

/// Shared resources handed to every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ScoreRetrievalEngine>,
    pub users: Arc<dyn UserDirectory>,
    pub config: ScoresConfig,
}

impl AppState {
    pub fn new(engine: Arc<ScoreRetrievalEngine>, users: Arc<dyn UserDirectory>) -> Self {
        let config = engine.config().clone();
        Self {
            engine,
            users,
            config,
        }
    }
}
