//! Error types for the action engine.

/// Errors that stop a run from starting.
///
/// Once a run has started, every failure is folded into the transcript and
/// the outcome history instead of surfacing here.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Action group is not runnable: {0}")]
    Validation(#[from] ValidationError),
    #[error("Action group is already running: {0}")]
    AlreadyRunning(String),
}

/// Pre-flight validation failures for a group's primary actions.
///
/// `index` is 0-based; messages number actions from 1, as the transcript
/// does.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Action {} has no command", .index + 1)]
    EmptyCommand { index: usize },
    #[error("Action {} ({command}) is missing required parameter '{parameter}'", .index + 1)]
    MissingParameter {
        index: usize,
        command: String,
        parameter: &'static str,
    },
}

/// Failures talking to the device-control backend.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Backend request failed: {0}")]
    Transport(String),
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Backend response invalid: {0}")]
    Decode(String),
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_error_display() {
        let err = ActionError::AlreadyRunning("edge-42".to_string());
        assert_eq!(err.to_string(), "Action group is already running: edge-42");

        let err = ActionError::Validation(ValidationError::EmptyCommand { index: 0 });
        assert_eq!(
            err.to_string(),
            "Action group is not runnable: Action 1 has no command"
        );
    }

    #[test]
    fn test_action_error_from_validation_error() {
        let err: ActionError = ValidationError::MissingParameter {
            index: 2,
            command: "input_text".to_string(),
            parameter: "text",
        }
        .into();
        assert!(matches!(err, ActionError::Validation(_)));
        assert!(err.to_string().contains("'text'"));
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::MissingParameter {
            index: 1,
            command: "click_element".to_string(),
            parameter: "element_id",
        };
        assert_eq!(
            err.to_string(),
            "Action 2 (click_element) is missing required parameter 'element_id'"
        );
    }

    #[test]
    fn test_dispatch_error_display() {
        let err = DispatchError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "Backend request failed: connection refused");

        let err = DispatchError::Status {
            status: 503,
            body: "device busy".to_string(),
        };
        assert_eq!(err.to_string(), "Backend returned 503: device busy");

        let err = DispatchError::Decode(String::new());
        assert_eq!(err.to_string(), "Backend response invalid: ");
    }
}
