//! Optimistic read-compute-write transactions over a `DocumentStore`.

use std::time::Duration;

use konchina_engine::GameState;
use rand::random;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::store::DocumentStore;

const MAX_RETRY_DELAY_MS: f64 = 250.0;
const RETRY_DELAY_MULTIPLIER: f64 = 2.0;
const JITTER_PERCENT: f64 = 0.25;

/// What a successful transaction read and wrote.
#[derive(Debug, Clone)]
pub struct TxnCommit<R> {
    /// The document as read on the winning attempt.
    pub before: Option<GameState>,
    pub after: GameState,
    /// Version of `after` in the store.
    pub version: u64,
    /// Attempts used, including the winning one.
    pub attempts: u32,
    /// False when the closure produced an identical document and nothing
    /// was written.
    pub written: bool,
    pub value: R,
}

/// Run `f` against a fresh copy of the room and commit its result.
///
/// `f` receives the document exactly as stored (or `None` if the room does
/// not exist) and returns the new document plus a value for the caller. If
/// another writer commits between the read and the write, the whole cycle is
/// re-run on the newer document, up to `txn_max_attempts` times. Errors from
/// `f` abort immediately and nothing is written.
pub async fn with_room_txn<S, F, R>(
    store: &S,
    config: &SyncConfig,
    room_id: &str,
    mut f: F,
) -> Result<TxnCommit<R>, SyncError>
where
    S: DocumentStore + ?Sized,
    F: FnMut(Option<GameState>) -> Result<(GameState, R), SyncError>,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;

        let current = store.get(room_id).await?;
        let (read_version, before) = match current {
            Some(v) => (Some(v.version), Some(v.doc)),
            None => (None, None),
        };

        let (after, value) = f(before.clone())?;

        if before.as_ref() == Some(&after) {
            if let Some(version) = read_version {
                debug!(room_id, version, "Transition left the room unchanged");
                return Ok(TxnCommit {
                    before,
                    after,
                    version,
                    attempts: attempt,
                    written: false,
                    value,
                });
            }
        }

        match store.compare_and_swap(room_id, read_version, after.clone()).await {
            Ok(version) => {
                debug!(room_id, version, attempt, "Room transaction committed");
                return Ok(TxnCommit {
                    before,
                    after,
                    version,
                    attempts: attempt,
                    written: true,
                    value,
                });
            }
            Err(err) if err.is_retryable() => {
                if attempt >= config.txn_max_attempts {
                    warn!(room_id, attempts = attempt, error = %err, "Room transaction gave up");
                    return Err(SyncError::RetriesExhausted { attempts: attempt });
                }
                let delay = calculate_retry_delay(config.txn_backoff_ms, attempt);
                debug!(
                    room_id,
                    attempt,
                    retry_delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Write conflict, re-reading room"
                );
                sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Exponential backoff with +/-25% jitter, capped at 250ms.
pub fn calculate_retry_delay(base_ms: u64, attempt: u32) -> Duration {
    if base_ms == 0 {
        return Duration::ZERO;
    }
    let base_delay = base_ms as f64 * RETRY_DELAY_MULTIPLIER.powi(attempt as i32 - 1);
    let capped_delay = base_delay.min(MAX_RETRY_DELAY_MS);

    let jitter_range = capped_delay * JITTER_PERCENT;
    let jitter = (random::<f64>() * 2.0 - 1.0) * jitter_range;
    let final_delay = (capped_delay + jitter).max(0.0);

    Duration::from_secs_f64(final_delay / 1000.0)
}
