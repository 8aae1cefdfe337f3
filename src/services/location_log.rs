//! Location-log persistence — background batch writer.
//!
//! DESIGN
//! ======
//! Position fixes are appended through a bounded queue drained by a
//! batching worker, so websocket handling never blocks on Postgres I/O.
//! The positioning pipeline only ever calls `try_send`: a full or closed
//! queue drops the entry with a warning and the session carries on.
//!
//! ERROR HANDLING
//! ==============
//! Batches are retried with linear backoff. A batch that still fails
//! after the retries is dropped — the log is an audit trail, not the
//! source of truth, and losing entries beats stalling live positioning.

use std::time::Duration;

use sqlx::PgPool;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::state::{AppState, LocationLog};

const DEFAULT_LOG_QUEUE_CAPACITY: usize = 8192;
const DEFAULT_LOG_BATCH_SIZE: usize = 64;
const DEFAULT_LOG_FLUSH_MS: u64 = 100;
const DEFAULT_LOG_RETRIES: usize = 2;
const DEFAULT_LOG_RETRY_BASE_MS: u64 = 20;

/// Tuning knobs for the log worker, loaded from environment variables.
#[derive(Clone, Copy)]
pub(crate) struct LogSinkConfig {
    /// Bounded channel capacity for the append queue.
    pub(crate) queue_capacity: usize,
    /// Maximum entries flushed per Postgres write batch.
    pub(crate) batch_size: usize,
    /// How long to wait for the batch to fill before flushing, in ms.
    pub(crate) flush_ms: u64,
    /// Retry attempts on transient database failures.
    pub(crate) retries: usize,
    /// Base delay in milliseconds for linear retry back-off.
    pub(crate) retry_base_ms: u64,
}

impl LogSinkConfig {
    pub(crate) fn from_env() -> Self {
        Self {
            queue_capacity: env_parse("LOCATION_LOG_QUEUE_CAPACITY", DEFAULT_LOG_QUEUE_CAPACITY),
            batch_size: env_parse("LOCATION_LOG_BATCH_SIZE", DEFAULT_LOG_BATCH_SIZE),
            flush_ms: env_parse("LOCATION_LOG_FLUSH_MS", DEFAULT_LOG_FLUSH_MS),
            retries: env_parse("LOCATION_LOG_RETRIES", DEFAULT_LOG_RETRIES),
            retry_base_ms: env_parse("LOCATION_LOG_RETRY_BASE_MS", DEFAULT_LOG_RETRY_BASE_MS),
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Spawn the bounded log worker and return its queue sender.
#[must_use]
pub fn spawn_log_worker(pool: PgPool) -> tokio::sync::mpsc::Sender<LocationLog> {
    let config = LogSinkConfig::from_env();
    let (tx, mut rx) = tokio::sync::mpsc::channel::<LocationLog>(config.queue_capacity);

    info!(
        queue_capacity = config.queue_capacity,
        batch_size = config.batch_size,
        flush_ms = config.flush_ms,
        retries = config.retries,
        retry_base_ms = config.retry_base_ms,
        "location log worker configured"
    );

    tokio::spawn(async move {
        let mut batch: Vec<LocationLog> = Vec::with_capacity(config.batch_size);
        let mut ticker = tokio::time::interval(Duration::from_millis(config.flush_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                maybe_entry = rx.recv() => {
                    if let Some(entry) = maybe_entry {
                        batch.push(entry);
                        if batch.len() >= config.batch_size {
                            flush_batch_with_retry(&pool, &mut batch, config).await;
                        }
                    } else {
                        flush_batch_with_retry(&pool, &mut batch, config).await;
                        break;
                    }
                }
                _ = ticker.tick() => {
                    flush_batch_with_retry(&pool, &mut batch, config).await;
                }
            }
        }
    });

    tx
}

/// Best-effort, non-blocking append.
pub fn append(state: &AppState, entry: LocationLog) {
    let Some(tx) = &state.log_tx else {
        return;
    };

    match tx.try_send(entry) {
        Ok(()) => {}
        Err(tokio::sync::mpsc::error::TrySendError::Full(dropped)) => {
            warn!(session_id = %dropped.session_id, "location log queue full; dropping entry");
        }
        Err(tokio::sync::mpsc::error::TrySendError::Closed(dropped)) => {
            warn!(session_id = %dropped.session_id, "location log queue closed; dropping entry");
        }
    }
}

async fn flush_batch_with_retry(pool: &PgPool, batch: &mut Vec<LocationLog>, config: LogSinkConfig) {
    if batch.is_empty() {
        return;
    }

    let drained = std::mem::take(batch);
    for attempt in 1..=config.retries {
        match insert_batch(pool, &drained).await {
            Ok(()) => return,
            Err(e) if attempt < config.retries => {
                warn!(
                    error = %e,
                    attempt,
                    total = config.retries,
                    count = drained.len(),
                    "location log batch failed; retrying"
                );
                tokio::time::sleep(Duration::from_millis((attempt as u64) * config.retry_base_ms)).await;
            }
            Err(e) => {
                warn!(
                    error = %e,
                    count = drained.len(),
                    "location log batch failed after retries; dropping entries"
                );
                return;
            }
        }
    }
}

/// Persist a batch of log entries in one transaction.
pub async fn insert_batch(pool: &PgPool, entries: &[LocationLog]) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for entry in entries {
        sqlx::query(
            "INSERT INTO location_logs (session_id, x, y, zone_name, target_destination, ts)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(entry.session_id)
        .bind(entry.x)
        .bind(entry.y)
        .bind(&entry.zone_name)
        .bind(&entry.target_destination)
        .bind(entry.timestamp_ms)
        .execute(tx.as_mut())
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
#[path = "location_log_test.rs"]
mod tests;
