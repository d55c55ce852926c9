//! Deliberate delays between actions and after a group.

use std::time::Duration;

/// Suspend the current run for `ms` milliseconds. Zero returns immediately.
pub async fn pause(ms: u64) {
    if ms == 0 {
        return;
    }
    tracing::debug!(wait_ms = ms, "Waiting");
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
