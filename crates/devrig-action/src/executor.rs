//! Action group executor.
//!
//! Runs a group's primary actions one at a time, halting at the first
//! failure, then falls back to the retry actions. Each attempt refreshes the
//! action's outcome history and adds outcome and confidence lines to the
//! transcript.
//!
//! Phases per run: Idle -> RunningPrimary -> (RunningRetry) -> Idle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use devrig_core::config::FinalWaitPolicy;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::binder::bind;
use crate::dispatch::DeviceControl;
use crate::error::ActionError;
use crate::observer::OutcomeObserver;
use crate::reliability::{confidence, record_outcome};
use crate::timing::pause;
use crate::types::{
    Action, ActionGroup, DispatchResponse, EntryKind, GroupOutcome, RunPhase, RunReport,
    Transcript,
};
use crate::validation::{self, validate};

type InFlightTable = Mutex<HashMap<String, RunPhase>>;

/// Executes action groups against a device, one run per group at a time.
pub struct ActionExecutor {
    device: Arc<dyn DeviceControl>,
    final_wait_policy: FinalWaitPolicy,
    in_flight: InFlightTable,
}

/// Which list of a group is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionList {
    Primary,
    Retry,
}

impl ActionList {
    fn label(self, index: usize) -> String {
        match self {
            ActionList::Primary => format!("Action {}", index + 1),
            ActionList::Retry => format!("Retry action {}", index + 1),
        }
    }

    fn notify(self, observer: &dyn OutcomeObserver, index: usize, history: &[bool]) {
        match self {
            ActionList::Primary => observer.on_primary_outcome(index, history),
            ActionList::Retry => observer.on_retry_outcome(index, history),
        }
    }
}

struct ListRun {
    actions: Vec<Action>,
    completed: bool,
}

/// Entry in the in-flight table, removed when the run ends or is dropped.
struct InFlight<'a> {
    table: &'a InFlightTable,
    group_id: String,
}

impl<'a> InFlight<'a> {
    fn acquire(table: &'a InFlightTable, group_id: &str) -> Result<Self, ActionError> {
        let mut runs = lock(table);
        if runs.contains_key(group_id) {
            return Err(ActionError::AlreadyRunning(group_id.to_string()));
        }
        runs.insert(group_id.to_string(), RunPhase::RunningPrimary);
        Ok(Self {
            table,
            group_id: group_id.to_string(),
        })
    }

    fn set_phase(&self, phase: RunPhase) {
        if let Some(current) = lock(self.table).get_mut(&self.group_id) {
            *current = phase;
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.table).remove(&self.group_id);
    }
}

fn lock(table: &InFlightTable) -> MutexGuard<'_, HashMap<String, RunPhase>> {
    // The table holds plain values, so a poisoned lock is still consistent.
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ActionExecutor {
    /// Create an executor dispatching through `device`.
    pub fn new(device: Arc<dyn DeviceControl>) -> Self {
        Self {
            device,
            final_wait_policy: FinalWaitPolicy::default(),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_final_wait_policy(mut self, policy: FinalWaitPolicy) -> Self {
        self.final_wait_policy = policy;
        self
    }

    pub fn final_wait_policy(&self) -> FinalWaitPolicy {
        self.final_wait_policy
    }

    /// Current phase of the group with `group_id`.
    pub fn status(&self, group_id: &str) -> RunPhase {
        lock(&self.in_flight)
            .get(group_id)
            .copied()
            .unwrap_or(RunPhase::Idle)
    }

    /// Whether `group` passes pre-flight validation.
    pub fn is_runnable(&self, group: &ActionGroup) -> bool {
        validation::is_runnable(group)
    }

    /// Run `group` to completion.
    ///
    /// Returns an error only when the run cannot start: the group fails
    /// validation or another run of the same group is in flight. Every
    /// failure after that is reported through the returned transcript.
    pub async fn execute(
        &self,
        group: ActionGroup,
        observer: &dyn OutcomeObserver,
    ) -> Result<RunReport, ActionError> {
        validate(&group)?;
        let guard = InFlight::acquire(&self.in_flight, &group.id)?;

        let ActionGroup {
            id: group_id,
            actions,
            retry_actions,
            final_wait_time_ms,
        } = group;
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let mut transcript = Transcript::new();

        info!(
            group_id = %group_id,
            run_id = %run_id,
            actions = actions.len(),
            retry_actions = retry_actions.len(),
            "Action group run started"
        );

        let primary = self
            .run_list(ActionList::Primary, actions, &mut transcript, observer)
            .await;

        let (outcome, retried) = if primary.completed {
            (GroupOutcome::Succeeded, None)
        } else if retry_actions.is_empty() {
            (GroupOutcome::Failed, None)
        } else {
            transcript.push(
                EntryKind::Notice,
                format!(
                    "Main actions failed, running {} retry action(s)",
                    retry_actions.len()
                ),
            );
            guard.set_phase(RunPhase::RunningRetry);
            let retry = self
                .run_list(ActionList::Retry, retry_actions, &mut transcript, observer)
                .await;
            let outcome = if retry.completed {
                GroupOutcome::Succeeded
            } else {
                GroupOutcome::Failed
            };
            (outcome, Some(retry.actions))
        };

        let final_wait = match (self.final_wait_policy, outcome) {
            (FinalWaitPolicy::Always, _) | (FinalWaitPolicy::OnSuccess, GroupOutcome::Succeeded) => {
                final_wait_time_ms
            }
            (FinalWaitPolicy::OnSuccess, GroupOutcome::Failed) => 0,
        };
        pause(final_wait).await;

        transcript.push(
            EntryKind::Notice,
            match outcome {
                GroupOutcome::Succeeded => "Action group succeeded",
                GroupOutcome::Failed => "Action group failed",
            },
        );

        drop(guard);
        info!(group_id = %group_id, run_id = %run_id, outcome = %outcome, "Action group run finished");

        Ok(RunReport {
            run_id,
            group_id,
            outcome,
            transcript,
            actions: primary.actions,
            retry_actions: retried,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Run one list with halt-on-failure. Actions after the halt point are
    /// returned untouched.
    async fn run_list(
        &self,
        list: ActionList,
        actions: Vec<Action>,
        transcript: &mut Transcript,
        observer: &dyn OutcomeObserver,
    ) -> ListRun {
        let mut updated = Vec::with_capacity(actions.len());
        let mut remaining = actions.into_iter().enumerate();
        let mut completed = true;

        for (index, mut action) in remaining.by_ref() {
            let label = list.label(index);

            let success = if action.is_configured() {
                let bound = bind(&action);
                for warning in &bound.warnings {
                    transcript.push(EntryKind::Warning, format!("{}: {}", label, warning));
                }
                let response = self.dispatch(&action, &bound.params).await;
                let verdict = if response.success { "success" } else { "failed" };
                transcript.push(
                    EntryKind::Outcome,
                    format!(
                        "{} ({}): {} - {}",
                        label,
                        action.command,
                        verdict,
                        response.summary()
                    ),
                );
                response.success
            } else {
                warn!(index, command = %action.command, "Action has no id, skipping dispatch");
                transcript.push(
                    EntryKind::Outcome,
                    format!(
                        "{} ({}): failed - action is not configured",
                        label, action.command
                    ),
                );
                false
            };

            action.outcome_history = record_outcome(&action.outcome_history, success);
            let score = confidence(&action.outcome_history);
            transcript.push(
                EntryKind::Confidence,
                format!(
                    "{} confidence: {} over {} run(s)",
                    label,
                    score,
                    action.outcome_history.len()
                ),
            );
            list.notify(observer, index, &action.outcome_history);

            let wait_time_ms = action.wait_time_ms;
            updated.push(action);

            if !success {
                completed = false;
                break;
            }
            pause(wait_time_ms).await;
        }

        updated.extend(remaining.map(|(_, action)| action));
        ListRun {
            actions: updated,
            completed,
        }
    }

    /// Send one action to the device, folding transport errors into a
    /// failed response.
    async fn dispatch(&self, action: &Action, params: &Map<String, Value>) -> DispatchResponse {
        debug!(command = %action.command, wait_time_ms = action.wait_time_ms, "Dispatching action");
        match self
            .device
            .execute(action.command.as_str(), params, action.wait_time_ms)
            .await
        {
            Ok(response) => {
                if !response.success {
                    warn!(command = %action.command, message = %response.summary(), "Action failed");
                }
                response
            }
            Err(err) => {
                warn!(command = %action.command, error = %err, "Action dispatch error");
                DispatchResponse::failure(err.to_string())
            }
        }
    }
}
