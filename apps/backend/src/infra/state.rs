use std::sync::Arc;

use redis::aio::ConnectionManager;
use redis::Client;
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::adapters::{SeaBeatmapResolver, SeaScoreStore, SeaUserDirectory};
use crate::cache::{CrossProcessBestSlot, LeaderboardCaches, MemoryBestSlot, RedisBestSlot};
use crate::config::ScoresConfig;
use crate::error::AppError;
use crate::infra::db::connect_db;
use crate::realtime::invalidation;
use crate::services::ScoreRetrievalEngine;
use crate::state::app_state::AppState;

/// Composition root: wires storage, caches and the engine into [`AppState`].
pub struct StateBuilder {
    config: Option<ScoresConfig>,
    db: Option<DatabaseConnection>,
    redis_url: Option<String>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            db: None,
            redis_url: None,
        }
    }

    pub fn with_config(mut self, config: ScoresConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use an existing connection instead of connecting from the environment.
    pub fn with_db(mut self, db: DatabaseConnection) -> Self {
        self.db = Some(db);
        self
    }

    /// Share personal-best slots and receive beatmap updates through Redis.
    ///
    /// Without it the slot is process-local and no listener runs.
    pub fn with_redis(mut self, redis_url: impl Into<String>) -> Self {
        self.redis_url = Some(redis_url.into());
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let config = match self.config {
            Some(config) => config,
            None => ScoresConfig::from_env()?,
        };
        let db = match self.db {
            Some(db) => db,
            None => connect_db().await?,
        };

        let best_slot: Arc<dyn CrossProcessBestSlot> = match &self.redis_url {
            Some(url) => {
                let client = Client::open(url.as_str())
                    .map_err(|err| AppError::config(format!("invalid REDIS_URL: {err}")))?;
                let manager = ConnectionManager::new(client).await.map_err(|err| {
                    AppError::internal(format!("unable to initialize redis connection manager: {err}"))
                })?;
                Arc::new(RedisBestSlot::new(manager))
            }
            None => Arc::new(MemoryBestSlot::new()),
        };

        let caches = Arc::new(LeaderboardCaches::new(&config.cache));
        let engine = Arc::new(ScoreRetrievalEngine::new(
            Arc::new(SeaScoreStore::new(db.clone())),
            Arc::new(SeaBeatmapResolver::new(db.clone())),
            best_slot,
            caches,
            config.clone(),
        ));

        if let Some(url) = &self.redis_url {
            invalidation::spawn(url, Arc::clone(&engine));
        }

        info!(
            cache_enabled = config.cache.enabled,
            page_cap = config.page_cap,
            maintenance = config.maintenance,
            redis = self.redis_url.is_some(),
            "application state built"
        );

        Ok(AppState::new(engine, Arc::new(SeaUserDirectory::new(db))))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
