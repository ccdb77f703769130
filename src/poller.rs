//! Per-wiki polling loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::checkpoint::CheckpointStore;
use crate::fandom::wiki::Wiki;

/// Upper bound for the adaptive interval.
const MAX_INTERVAL: Duration = Duration::from_secs(300);

/// Runs the wiki's poll loop until shutdown.
///
/// Each cycle's checkpoint is written back to the store on success.
/// Cancellation drops any in-flight cycle before its checkpoint write, so a
/// cancelled window is re-covered after restart.
pub async fn poll_loop(
    mut wiki: Wiki,
    store: Arc<dyn CheckpointStore>,
    base_interval: Duration,
    shutdown: CancellationToken,
) {
    // A stored checkpoint wins over the configured start time.
    if let Some(checkpoint) = store.get(wiki.id).await {
        wiki.last_check_time = wiki.last_check_time.max(checkpoint);
    }

    let mut consecutive_empty = 0u32;

    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            result = wiki.poll(Utc::now()) => match result {
                Ok(outcome) => {
                    store.set(wiki.id, outcome.window_end).await;
                    if outcome.entries > 0 {
                        info!(wiki = wiki.id, entries = outcome.entries, "Dispatched new activity");
                        consecutive_empty = 0;
                    } else {
                        consecutive_empty = consecutive_empty.saturating_add(1);
                        debug!(wiki = wiki.id, consecutive_empty, "No new activity");
                    }
                }
                Err(e) => {
                    error!(wiki = wiki.id, "Poll error: {e:#}");
                    consecutive_empty = consecutive_empty.saturating_add(1);
                }
            },
        }

        // Adaptive polling: back off while nothing is happening.
        let interval = if consecutive_empty > 10 {
            MAX_INTERVAL.min(base_interval * 2)
        } else if consecutive_empty > 5 {
            base_interval.mul_f32(1.5)
        } else {
            base_interval
        };

        tokio::select! {
            () = shutdown.cancelled() => break,
            () = tokio::time::sleep(interval) => {}
        }
    }

    info!(wiki = wiki.id, "Poll loop stopped");
}
