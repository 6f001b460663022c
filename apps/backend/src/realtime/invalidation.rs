//! Beatmap status updates arriving over Redis pub/sub.
//!
//! Whenever a map is ranked, unranked or replaced, an updater publishes one of
//! the [`BeatmapUpdate`] shapes on [`CHANNEL`]. Every process evicts all
//! leaderboard state derived from the affected hashes.

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use rand::random;
use redis::aio::PubSub;
use redis::Client;
use serde::Deserialize;
use tokio::time::sleep;
use tokio_stream::StreamExt;
use tracing::{error, info, warn};

use crate::cache::InvalidationReport;
use crate::error::AppError;
use crate::errors::domain::DomainError;
use crate::repos::BeatmapSelector;
use crate::services::ScoreRetrievalEngine;

pub const CHANNEL: &str = "scores:beatmap_updates";

const INITIAL_RETRY_DELAY_SECS: u64 = 1;
const MAX_RETRY_DELAY_SECS: u64 = 60;
const RETRY_DELAY_MULTIPLIER: f64 = 2.0;
const JITTER_PERCENT: f64 = 0.2;

/// Accepted payloads: `{"id": N}`, `{"set_id": N}` or `{"md5": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BeatmapUpdate {
    Map { id: i64 },
    Set { set_id: i64 },
    Hash { md5: String },
}

/// Resolve `update` to map hashes and evict each of them.
pub async fn apply(
    engine: &ScoreRetrievalEngine,
    update: &BeatmapUpdate,
) -> Result<InvalidationReport, DomainError> {
    let hashes = match update {
        BeatmapUpdate::Hash { md5 } => vec![md5.clone()],
        BeatmapUpdate::Map { id } => engine.beatmaps().map_hashes(BeatmapSelector::Map(*id)).await?,
        BeatmapUpdate::Set { set_id } => {
            engine
                .beatmaps()
                .map_hashes(BeatmapSelector::Set(*set_id))
                .await?
        }
    };

    let mut total = InvalidationReport::default();
    for hash in &hashes {
        let report = engine.caches().invalidate_map(hash).await;
        total.pages += report.pages;
        total.personal_bests += report.personal_bests;
    }
    info!(?update, maps = hashes.len(), pages = total.pages, "beatmap update applied");
    Ok(total)
}

/// Decode and apply one raw message. Malformed payloads are logged and dropped.
pub async fn handle_payload(engine: &ScoreRetrievalEngine, payload: &str) -> Option<InvalidationReport> {
    let update = match serde_json::from_str::<BeatmapUpdate>(payload) {
        Ok(update) => update,
        Err(err) => {
            warn!(error = %err, payload, "ignoring malformed beatmap update");
            return None;
        }
    };
    match apply(engine, &update).await {
        Ok(report) => Some(report),
        Err(err) => {
            error!(error = %err, ?update, "failed to resolve beatmap update");
            None
        }
    }
}

/// Run the subscriber in the background for the life of the process.
pub fn spawn(redis_url: &str, engine: Arc<ScoreRetrievalEngine>) {
    let redis_url = redis_url.to_string();
    tokio::spawn(async move {
        run_with_retry(&redis_url, engine).await;
    });
}

fn is_transient_error(err: &AppError) -> bool {
    if let AppError::Config { .. } = err {
        return false;
    }

    let message = err.to_string().to_lowercase();
    if message.contains("authentication failed")
        || message.contains("invalid redis_url")
        || message.contains("non-tcp protocol")
    {
        return false;
    }

    if let Some(io_err) = StdError::source(err).and_then(|s| s.downcast_ref::<std::io::Error>()) {
        if matches!(
            io_err.kind(),
            std::io::ErrorKind::PermissionDenied | std::io::ErrorKind::Unsupported
        ) {
            return false;
        }
    }

    true
}

fn calculate_retry_delay(attempt: u32) -> Duration {
    let base_delay =
        INITIAL_RETRY_DELAY_SECS as f64 * RETRY_DELAY_MULTIPLIER.powi(attempt as i32 - 1);
    let capped_delay = base_delay.min(MAX_RETRY_DELAY_SECS as f64);

    let jitter_range = capped_delay * JITTER_PERCENT;
    let jitter = (random::<f64>() * 2.0 - 1.0) * jitter_range;
    Duration::from_secs_f64((capped_delay + jitter).max(0.1))
}

async fn run_with_retry(redis_url: &str, engine: Arc<ScoreRetrievalEngine>) {
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        match run_subscription(redis_url, &engine).await {
            Ok(()) => {
                warn!("beatmap update stream ended, resubscribing");
                attempt = 0;
            }
            Err(err) => {
                if !is_transient_error(&err) {
                    error!(error = %err, attempt, "beatmap update subscription failed permanently");
                    break;
                }

                let delay = calculate_retry_delay(attempt);
                warn!(
                    error = %err,
                    attempt,
                    retry_delay_secs = delay.as_secs_f64(),
                    "beatmap update subscription failed, retrying"
                );
                sleep(delay).await;

                if attempt >= 20 {
                    attempt = 10;
                }
            }
        }
    }
}

async fn run_subscription(redis_url: &str, engine: &ScoreRetrievalEngine) -> Result<(), AppError> {
    let client = Client::open(redis_url)
        .map_err(|err| AppError::config(format!("invalid REDIS_URL: {err}")))?;
    let conn_info = client.get_connection_info();

    let addr = match conn_info.addr().clone() {
        redis::ConnectionAddr::Tcp(host, port) => (host, port),
        _ => return Err(AppError::config("non-tcp protocol is not supported for pubsub")),
    };

    let stream = tokio::net::TcpStream::connect((addr.0.as_str(), addr.1))
        .await
        .map_err(|err| AppError::internal(format!("redis connect failed: {err}")))?;

    let mut pubsub = PubSub::new(conn_info.redis_settings(), stream)
        .await
        .map_err(|err| AppError::internal(format!("redis pubsub setup failed: {err}")))?;

    pubsub
        .subscribe(CHANNEL)
        .await
        .map_err(|err| AppError::internal(format!("subscribe to {CHANNEL} failed: {err}")))?;
    info!(channel = CHANNEL, "subscribed to beatmap updates");

    let mut messages = pubsub.into_on_message();
    while let Some(msg) = messages.next().await {
        let Ok(payload) = msg.get_payload::<String>() else {
            warn!("dropping non-utf8 beatmap update");
            continue;
        };
        handle_payload(engine, &payload).await;
    }

    Ok(())
}
