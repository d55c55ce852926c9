//! Pre-flight validation gate.
//!
//! A group is runnable when every primary action names a command and every
//! known command has its required parameters. Parameters are checked after
//! input binding, so a value supplied as free-text input counts.

use serde_json::Value;

use crate::binder::bind;
use crate::error::ValidationError;
use crate::types::{Action, ActionGroup, Command};

/// Parameters that must be present and non-blank for each command.
pub fn required_params(command: &Command) -> &'static [&'static str] {
    match command {
        Command::InputText => &["text"],
        Command::ClickElement => &["element_id"],
        Command::LaunchApp | Command::CloseApp => &["package"],
        Command::TapCoordinates => &["x", "y"],
        Command::CoordinateTap | Command::PressKey | Command::Other(_) => &[],
    }
}

/// Validate the primary actions of `group`, reporting the first problem.
///
/// Retry actions are not checked; a broken retry action fails at run time.
pub fn validate(group: &ActionGroup) -> Result<(), ValidationError> {
    group
        .actions
        .iter()
        .enumerate()
        .try_for_each(|(index, action)| validate_action(index, action))
}

/// Every problem in the primary actions of `group`, at most one per action.
pub fn validation_errors(group: &ActionGroup) -> Vec<ValidationError> {
    group
        .actions
        .iter()
        .enumerate()
        .filter_map(|(index, action)| validate_action(index, action).err())
        .collect()
}

/// Whether `group` may be handed to the executor.
pub fn is_runnable(group: &ActionGroup) -> bool {
    validate(group).is_ok()
}

fn validate_action(index: usize, action: &Action) -> Result<(), ValidationError> {
    if action.command.is_blank() {
        return Err(ValidationError::EmptyCommand { index });
    }

    let required = required_params(&action.command);
    if required.is_empty() {
        return Ok(());
    }

    let bound = bind(action);
    for &parameter in required {
        if is_blank(bound.params.get(parameter)) {
            return Err(ValidationError::MissingParameter {
                index,
                command: action.command.to_string(),
                parameter,
            });
        }
    }
    Ok(())
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(actions: Vec<Action>) -> ActionGroup {
        ActionGroup::new("edge-1", actions)
    }

    #[test]
    fn test_empty_group_is_runnable() {
        assert!(is_runnable(&group(vec![])));
    }

    #[test]
    fn test_input_text_with_empty_text_not_runnable() {
        let action = Action::new("a1", "input text").with_param("text", "");
        assert!(!action.requires_input);
        let g = group(vec![action]);
        assert!(!is_runnable(&g));
        assert_eq!(
            validate(&g).unwrap_err(),
            ValidationError::MissingParameter {
                index: 0,
                command: "input_text".to_string(),
                parameter: "text",
            }
        );
    }

    #[test]
    fn test_whitespace_and_null_values_are_blank() {
        let g = group(vec![Action::new("a1", "click element").with_param("element_id", "  ")]);
        assert!(!is_runnable(&g));

        let g = group(vec![
            Action::new("a1", "launch app").with_param("package", serde_json::Value::Null)
        ]);
        assert!(!is_runnable(&g));
    }

    #[test]
    fn test_bound_input_satisfies_requirement() {
        let g = group(vec![Action::new("a1", "input text").with_input("hello")]);
        assert!(is_runnable(&g));

        let g = group(vec![Action::new("a1", "tap coordinates").with_input("10,20")]);
        assert!(is_runnable(&g));
    }

    #[test]
    fn test_tap_coordinates_requires_both_axes() {
        let g = group(vec![Action::new("a1", "tap coordinates").with_param("x", 10)]);
        let err = validate(&g).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::MissingParameter { parameter: "y", .. }
        ));

        let g = group(vec![Action::new("a1", "tap coordinates")
            .with_param("x", 0)
            .with_param("y", 0)]);
        assert!(is_runnable(&g));
    }

    #[test]
    fn test_malformed_coordinate_input_not_runnable() {
        let g = group(vec![Action::new("a1", "tap coordinates").with_input("ten,twenty")]);
        assert!(!is_runnable(&g));
    }

    #[test]
    fn test_empty_command_not_runnable() {
        let g = group(vec![
            Action::new("a1", "press_key"),
            Action::new("a2", ""),
        ]);
        assert_eq!(
            validate(&g).unwrap_err(),
            ValidationError::EmptyCommand { index: 1 }
        );
    }

    #[test]
    fn test_validation_errors_reports_each_broken_action() {
        let g = group(vec![
            Action::new("a1", ""),
            Action::new("a2", "press_key"),
            Action::new("a3", "launch app"),
        ]);
        let errors = validation_errors(&g);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0], ValidationError::EmptyCommand { index: 0 });
        assert!(matches!(
            errors[1],
            ValidationError::MissingParameter { index: 2, parameter: "package", .. }
        ));
        assert!(validation_errors(&group(vec![])).is_empty());
    }

    #[test]
    fn test_commands_without_requirements_pass() {
        let g = group(vec![
            Action::new("a1", "press_key"),
            Action::new("a2", "coordinate tap"),
            Action::new("a3", "wait_for_element"),
        ]);
        assert!(is_runnable(&g));
    }

    #[test]
    fn test_retry_actions_are_not_validated() {
        let g = group(vec![Action::new("a1", "press_key")])
            .with_retry_actions(vec![Action::new("r1", "input text")]);
        assert!(is_runnable(&g));
    }

    #[test]
    fn test_missing_identity_is_not_a_validation_error() {
        let mut action = Action::new("a1", "press_key");
        action.id = None;
        assert!(is_runnable(&group(vec![action])));
    }
}
