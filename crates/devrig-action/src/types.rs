//! Core types and value objects for the action engine.
//!
//! Defines device commands, actions and groups, the dispatch response shape,
//! the run transcript and the run report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

use crate::reliability::{self, ConfidenceScore};

// =============================================================================
// Enums
// =============================================================================

/// Device command understood by the backend.
///
/// Known commands carry binding and validation rules. Anything else is an
/// open-ended command forwarded to the backend verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Command {
    LaunchApp,
    CloseApp,
    InputText,
    ClickElement,
    TapCoordinates,
    CoordinateTap,
    PressKey,
    Other(String),
}

impl Command {
    /// Wire name sent to the backend.
    pub fn as_str(&self) -> &str {
        match self {
            Command::LaunchApp => "launch_app",
            Command::CloseApp => "close_app",
            Command::InputText => "input_text",
            Command::ClickElement => "click_element",
            Command::TapCoordinates => "tap_coordinates",
            Command::CoordinateTap => "coordinate_tap",
            Command::PressKey => "press_key",
            Command::Other(name) => name,
        }
    }

    /// True when no command has been chosen.
    pub fn is_blank(&self) -> bool {
        matches!(self, Command::Other(name) if name.trim().is_empty())
    }
}

impl From<&str> for Command {
    /// Accepts both "launch app" and "launch_app" spellings of known commands.
    fn from(name: &str) -> Self {
        let normalized = name.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "launch_app" => Command::LaunchApp,
            "close_app" => Command::CloseApp,
            "input_text" => Command::InputText,
            "click_element" => Command::ClickElement,
            "tap_coordinates" => Command::TapCoordinates,
            "coordinate_tap" => Command::CoordinateTap,
            "press_key" => Command::PressKey,
            _ => Command::Other(name.to_string()),
        }
    }
}

impl From<String> for Command {
    fn from(name: String) -> Self {
        Command::from(name.as_str())
    }
}

impl From<Command> for String {
    fn from(command: Command) -> Self {
        match command {
            Command::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase of a group's run as seen by the single-flight guard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    RunningPrimary,
    RunningRetry,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Idle => write!(f, "idle"),
            RunPhase::RunningPrimary => write!(f, "running_primary"),
            RunPhase::RunningRetry => write!(f, "running_retry"),
        }
    }
}

/// Overall outcome of one run of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupOutcome {
    Succeeded,
    Failed,
}

impl fmt::Display for GroupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupOutcome::Succeeded => write!(f, "succeeded"),
            GroupOutcome::Failed => write!(f, "failed"),
        }
    }
}

// =============================================================================
// Domain Structs
// =============================================================================

/// A single device command with its parameters and recent outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Absent or empty means the action was never configured.
    #[serde(default)]
    pub id: Option<String>,
    pub command: Command,
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub requires_input: bool,
    #[serde(default)]
    pub input_value: Option<String>,
    /// Delay after a successful dispatch, before the next action.
    #[serde(default)]
    pub wait_time_ms: u64,
    /// Most-recent-first, at most `MAX_OUTCOME_HISTORY` entries.
    #[serde(default)]
    pub outcome_history: Vec<bool>,
}

impl Action {
    pub fn new(id: impl Into<String>, command: impl Into<Command>) -> Self {
        Self {
            id: Some(id.into()),
            command: command.into(),
            params: Map::new(),
            requires_input: false,
            input_value: None,
            wait_time_ms: 0,
            outcome_history: Vec::new(),
        }
    }

    /// Set a single parameter.
    pub fn with_param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    /// Mark the action as taking free-text input and supply the value.
    pub fn with_input(mut self, value: impl Into<String>) -> Self {
        self.requires_input = true;
        self.input_value = Some(value.into());
        self
    }

    pub fn with_wait_ms(mut self, wait_time_ms: u64) -> Self {
        self.wait_time_ms = wait_time_ms;
        self
    }

    pub fn with_history(mut self, history: Vec<bool>) -> Self {
        self.outcome_history = history;
        self
    }

    /// Whether the action has an identity and may be dispatched.
    pub fn is_configured(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.trim().is_empty())
    }

    /// Confidence derived from the current outcome history.
    pub fn confidence(&self) -> ConfidenceScore {
        reliability::confidence(&self.outcome_history)
    }
}

/// Primary actions, retry actions and a final wait: the unit of execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionGroup {
    /// Key for the single-flight guard, typically the owning edge id.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub retry_actions: Vec<Action>,
    #[serde(default)]
    pub final_wait_time_ms: u64,
}

impl ActionGroup {
    pub fn new(id: impl Into<String>, actions: Vec<Action>) -> Self {
        Self {
            id: id.into(),
            actions,
            ..Self::default()
        }
    }

    pub fn with_retry_actions(mut self, retry_actions: Vec<Action>) -> Self {
        self.retry_actions = retry_actions;
        self
    }

    pub fn with_final_wait_ms(mut self, final_wait_time_ms: u64) -> Self {
        self.final_wait_time_ms = final_wait_time_ms;
        self
    }
}

/// Result reported by the device-control backend for one dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DispatchResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }

    /// Text for the transcript: error first on failure, message otherwise.
    pub fn summary(&self) -> &str {
        let preferred = if self.success {
            self.message.as_deref().or(self.error.as_deref())
        } else {
            self.error.as_deref().or(self.message.as_deref())
        };
        preferred
            .filter(|text| !text.trim().is_empty())
            .unwrap_or("no message")
    }
}

// =============================================================================
// Transcript
// =============================================================================

/// Kind of a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Result of one action attempt.
    Outcome,
    /// Confidence annotation following an outcome.
    Confidence,
    /// Run-level progress.
    Notice,
    /// Non-fatal problem, e.g. malformed coordinate input.
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub kind: EntryKind,
    pub text: String,
}

/// Ordered, human-readable record of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript(Vec<TranscriptEntry>);

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: EntryKind, text: impl Into<String>) {
        self.0.push(TranscriptEntry {
            kind,
            text: text.into(),
        });
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.0
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|entry| entry.text.as_str())
    }

    /// Lines of a single kind, in order.
    pub fn lines_of(&self, kind: EntryKind) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(move |entry| entry.kind == kind)
            .map(|entry| entry.text.as_str())
    }

    pub fn count(&self, kind: EntryKind) -> usize {
        self.0.iter().filter(|entry| entry.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            f.write_str(&entry.text)?;
        }
        Ok(())
    }
}

/// Everything a caller needs after one run of a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub group_id: String,
    pub outcome: GroupOutcome,
    pub transcript: Transcript,
    /// Primary actions with refreshed outcome history.
    pub actions: Vec<Action>,
    /// Retry actions with refreshed outcome history, only when they ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_actions: Option<Vec<Action>>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.outcome == GroupOutcome::Succeeded
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Command ----

    #[test]
    fn test_command_from_spaced_and_snake_names() {
        assert_eq!(Command::from("launch app"), Command::LaunchApp);
        assert_eq!(Command::from("launch_app"), Command::LaunchApp);
        assert_eq!(Command::from("Close App"), Command::CloseApp);
        assert_eq!(Command::from("input text"), Command::InputText);
        assert_eq!(Command::from("click_element"), Command::ClickElement);
        assert_eq!(Command::from("tap coordinates"), Command::TapCoordinates);
        assert_eq!(Command::from("coordinate tap"), Command::CoordinateTap);
        assert_eq!(Command::from("press_key"), Command::PressKey);
    }

    #[test]
    fn test_command_other_is_forwarded_verbatim() {
        let command = Command::from("swipe_up Fast");
        assert_eq!(command, Command::Other("swipe_up Fast".to_string()));
        assert_eq!(command.as_str(), "swipe_up Fast");
        assert_eq!(String::from(command), "swipe_up Fast");
    }

    #[test]
    fn test_command_wire_names() {
        assert_eq!(Command::LaunchApp.to_string(), "launch_app");
        assert_eq!(Command::TapCoordinates.to_string(), "tap_coordinates");
        assert_eq!(Command::CoordinateTap.to_string(), "coordinate_tap");
        assert_eq!(String::from(Command::InputText), "input_text");
    }

    #[test]
    fn test_command_is_blank() {
        assert!(Command::from("").is_blank());
        assert!(Command::from("   ").is_blank());
        assert!(!Command::from("press_key").is_blank());
        assert!(!Command::from("reboot").is_blank());
    }

    #[test]
    fn test_command_serde_as_string() {
        let json = serde_json::to_string(&Command::ClickElement).unwrap();
        assert_eq!(json, "\"click_element\"");
        let parsed: Command = serde_json::from_str("\"tap coordinates\"").unwrap();
        assert_eq!(parsed, Command::TapCoordinates);
    }

    // ---- Action ----

    #[test]
    fn test_action_is_configured() {
        assert!(Action::new("a1", "press_key").is_configured());
        assert!(!Action::new("", "press_key").is_configured());
        assert!(!Action::new("  ", "press_key").is_configured());

        let mut action = Action::new("a1", "press_key");
        action.id = None;
        assert!(!action.is_configured());
    }

    #[test]
    fn test_action_deserialize_with_defaults() {
        let action: Action =
            serde_json::from_str(r#"{"id":"a1","command":"input text"}"#).unwrap();
        assert_eq!(action.command, Command::InputText);
        assert!(action.params.is_empty());
        assert!(!action.requires_input);
        assert_eq!(action.wait_time_ms, 0);
        assert!(action.outcome_history.is_empty());
    }

    #[test]
    fn test_action_confidence_uses_history() {
        let action = Action::new("a1", "press_key").with_history(vec![true, false]);
        assert!((action.confidence().value() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_group_deserialize_minimal() {
        let group: ActionGroup = serde_json::from_str(
            r#"{"id":"edge-1","actions":[{"id":"a","command":"press_key","params":{"key":"HOME"}}]}"#,
        )
        .unwrap();
        assert_eq!(group.id, "edge-1");
        assert_eq!(group.actions.len(), 1);
        assert!(group.retry_actions.is_empty());
        assert_eq!(group.final_wait_time_ms, 0);
    }

    // ---- DispatchResponse ----

    #[test]
    fn test_dispatch_response_summary() {
        assert_eq!(DispatchResponse::success("done").summary(), "done");
        assert_eq!(DispatchResponse::failure("timeout").summary(), "timeout");

        let bare = DispatchResponse {
            success: false,
            message: Some("tap sent".to_string()),
            error: None,
        };
        assert_eq!(bare.summary(), "tap sent");

        let empty = DispatchResponse {
            success: true,
            message: Some(String::new()),
            error: None,
        };
        assert_eq!(empty.summary(), "no message");
    }

    #[test]
    fn test_dispatch_response_deserialize_without_optionals() {
        let resp: DispatchResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(resp.success);
        assert!(resp.message.is_none());
        assert!(resp.error.is_none());
    }

    // ---- Transcript ----

    #[test]
    fn test_transcript_counts_and_display() {
        let mut transcript = Transcript::new();
        transcript.push(EntryKind::Outcome, "Action 1 (press_key): success - ok");
        transcript.push(EntryKind::Confidence, "Action 1 confidence: 100% over 1 run(s)");
        transcript.push(EntryKind::Notice, "Group succeeded");

        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.count(EntryKind::Outcome), 1);
        assert_eq!(
            transcript.lines_of(EntryKind::Notice).collect::<Vec<_>>(),
            vec!["Group succeeded"]
        );
        assert_eq!(
            transcript.to_string(),
            "Action 1 (press_key): success - ok\nAction 1 confidence: 100% over 1 run(s)\nGroup succeeded"
        );
    }

    #[test]
    fn test_run_phase_display() {
        assert_eq!(RunPhase::Idle.to_string(), "idle");
        assert_eq!(RunPhase::RunningPrimary.to_string(), "running_primary");
        assert_eq!(RunPhase::RunningRetry.to_string(), "running_retry");
        assert_eq!(RunPhase::default(), RunPhase::Idle);
    }
}
