//! Bounded outcome history and the confidence score derived from it.
//!
//! Both functions are pure: callers own the history and store whatever
//! comes back.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of outcomes kept per action.
pub const MAX_OUTCOME_HISTORY: usize = 10;

/// Confidence assigned to an action that has never run.
const NEUTRAL_CONFIDENCE: f64 = 0.5;

/// Reliability of an action in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfidenceScore(f64);

impl ConfidenceScore {
    pub fn value(self) -> f64 {
        self.0
    }

    /// Rounded percentage for display.
    pub fn percent(self) -> u8 {
        (self.0 * 100.0).round() as u8
    }
}

impl fmt::Display for ConfidenceScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// Prepend `outcome` and keep the newest `MAX_OUTCOME_HISTORY` entries.
pub fn record_outcome(history: &[bool], outcome: bool) -> Vec<bool> {
    let mut updated = Vec::with_capacity(MAX_OUTCOME_HISTORY);
    updated.push(outcome);
    updated.extend(history.iter().copied().take(MAX_OUTCOME_HISTORY - 1));
    updated
}

/// Share of successes in `history`, or 0.5 when it is empty.
pub fn confidence(history: &[bool]) -> ConfidenceScore {
    if history.is_empty() {
        return ConfidenceScore(NEUTRAL_CONFIDENCE);
    }
    let successes = history.iter().filter(|&&ok| ok).count();
    ConfidenceScore(successes as f64 / history.len() as f64)
}
