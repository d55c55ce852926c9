//! Outcome events broadcast to SSE subscribers.

use devrig_action::{confidence, OutcomeObserver};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Which list of a group an outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionListKind {
    Primary,
    Retry,
}

/// One outcome-history update, sent as an SSE `outcome` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeEvent {
    pub list: ActionListKind,
    pub group_id: String,
    pub index: usize,
    pub history: Vec<bool>,
    pub confidence: f64,
}

/// Observer that publishes every history update for one group's run.
pub struct BroadcastObserver {
    group_id: String,
    tx: broadcast::Sender<OutcomeEvent>,
}

impl BroadcastObserver {
    pub fn new(group_id: impl Into<String>, tx: broadcast::Sender<OutcomeEvent>) -> Self {
        Self {
            group_id: group_id.into(),
            tx,
        }
    }

    fn publish(&self, list: ActionListKind, index: usize, history: &[bool]) {
        let event = OutcomeEvent {
            list,
            group_id: self.group_id.clone(),
            index,
            history: history.to_vec(),
            confidence: confidence(history).value(),
        };
        // No subscribers is not an error.
        if self.tx.send(event).is_err() {
            tracing::trace!(group_id = %self.group_id, index, "No outcome subscribers");
        }
    }
}

impl OutcomeObserver for BroadcastObserver {
    fn on_primary_outcome(&self, index: usize, history: &[bool]) {
        self.publish(ActionListKind::Primary, index, history);
    }

    fn on_retry_outcome(&self, index: usize, history: &[bool]) {
        self.publish(ActionListKind::Retry, index, history);
    }
}
