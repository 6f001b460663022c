use std::future::Future;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{info, warn};

use crate::config::db::{db_url, max_connections};
use crate::error::AppError;

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_INTERVAL_MS: u64 = 2_000;

/// Retry `connect_fn` at a fixed interval, returning the last error on exhaustion.
pub(crate) async fn retry_connection<T, F, Fut>(
    mut connect_fn: F,
    max_attempts: u32,
    interval: Duration,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt = 1;
    loop {
        match connect_fn().await {
            Ok(value) => {
                if attempt > 1 {
                    info!(attempts = attempt, "connection established after retry");
                }
                return Ok(value);
            }
            Err(err) if attempt < max_attempts => {
                warn!(
                    error = %err,
                    attempt,
                    max_attempts,
                    interval_ms = interval.as_millis() as u64,
                    "connection attempt failed"
                );
                tokio::time::sleep(interval).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Connect the score database pool.
///
/// The pool size is the concurrency bound for storage queries.
pub async fn connect_db() -> Result<DatabaseConnection, AppError> {
    let url = db_url()?;
    let max = max_connections()?;

    let mut options = ConnectOptions::new(url);
    options
        .max_connections(max)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);

    let conn = retry_connection(
        || {
            let options = options.clone();
            async move { Ok(Database::connect(options).await?) }
        },
        CONNECT_ATTEMPTS,
        Duration::from_millis(CONNECT_INTERVAL_MS),
    )
    .await?;

    info!(max_connections = max, "database pool ready");
    Ok(conn)
}
