//! Free-text input binding.
//!
//! Turns an action's optional user input into the concrete parameters sent
//! to the device. Which parameter receives the input is decided per command
//! by [`input_binding`].

use serde_json::{Map, Value};

use crate::types::{Action, Command};

/// Where a command puts its free-text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputBinding {
    /// Input becomes the named string parameter.
    Param(&'static str),
    /// Input is an `x,y` pair of integers.
    Coordinates,
    /// Command takes no free-text input.
    Unbound,
}

/// Binding rule for each command.
pub fn input_binding(command: &Command) -> InputBinding {
    match command {
        Command::LaunchApp | Command::CloseApp => InputBinding::Param("package"),
        Command::InputText => InputBinding::Param("text"),
        Command::ClickElement => InputBinding::Param("element_id"),
        Command::TapCoordinates | Command::CoordinateTap => InputBinding::Coordinates,
        Command::PressKey | Command::Other(_) => InputBinding::Unbound,
    }
}

/// Parameters ready for dispatch, plus any non-fatal binding problems.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundParams {
    pub params: Map<String, Value>,
    pub warnings: Vec<String>,
}

/// Bind `action.input_value` into a copy of `action.params`.
///
/// Input is only consumed when `requires_input` is set and the value is
/// non-empty; otherwise the parameters come back unchanged.
pub fn bind(action: &Action) -> BoundParams {
    let mut bound = BoundParams {
        params: action.params.clone(),
        warnings: Vec::new(),
    };

    let input = match action.input_value.as_deref() {
        Some(value) if action.requires_input && !value.is_empty() => value,
        _ => return bound,
    };

    match input_binding(&action.command) {
        InputBinding::Param(name) => {
            bound
                .params
                .insert(name.to_string(), Value::String(input.to_string()));
        }
        InputBinding::Coordinates => match parse_coordinates(input) {
            Some((x, y)) => {
                bound.params.insert("x".to_string(), Value::from(x));
                bound.params.insert("y".to_string(), Value::from(y));
            }
            None => {
                tracing::warn!(
                    command = %action.command,
                    input = %input,
                    "Invalid coordinate input, parameters left unchanged"
                );
                bound.warnings.push(format!(
                    "invalid coordinates '{}', expected 'x,y'",
                    input
                ));
            }
        },
        InputBinding::Unbound => {}
    }

    bound
}

/// Parse `"x, y"` into two integers.
fn parse_coordinates(input: &str) -> Option<(i64, i64)> {
    let (x, y) = input.split_once(',')?;
    let x = x.trim().parse().ok()?;
    let y = y.trim().parse().ok()?;
    Some((x, y))
}
