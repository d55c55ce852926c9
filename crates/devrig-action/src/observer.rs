//! Outcome callbacks for incremental persistence.

/// Notified after every outcome-history update, before the next action runs.
///
/// Observers are optional: the run report carries the same histories.
pub trait OutcomeObserver: Send + Sync {
    fn on_primary_outcome(&self, index: usize, history: &[bool]);
    fn on_retry_outcome(&self, index: usize, history: &[bool]);
}

/// Observer that ignores every callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl OutcomeObserver for NoopObserver {
    fn on_primary_outcome(&self, _index: usize, _history: &[bool]) {}
    fn on_retry_outcome(&self, _index: usize, _history: &[bool]) {}
}
