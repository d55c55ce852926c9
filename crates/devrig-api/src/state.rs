//! Application state shared across all route handlers.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use devrig_action::ActionExecutor;
use devrig_core::config::DevrigConfig;
use tokio::sync::broadcast;

use crate::events::OutcomeEvent;

/// Capacity of the outcome event channel. Slow SSE clients skip events
/// beyond this.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Mutex<DevrigConfig>>,
    /// Executor shared by every run, holding the in-flight table.
    pub executor: Arc<ActionExecutor>,
    /// Broadcast sender for SSE outcome events.
    pub event_tx: broadcast::Sender<OutcomeEvent>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: DevrigConfig, executor: ActionExecutor) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config: Arc::new(Mutex::new(config)),
            executor: Arc::new(executor),
            event_tx,
            start_time: Instant::now(),
        }
    }
}
