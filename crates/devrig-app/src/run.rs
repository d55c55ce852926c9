//! `devrig run`: execute an action group stored as JSON.

use std::path::Path;

use devrig_action::{ActionError, ActionExecutor, ActionGroup, NoopObserver, RunReport};
use devrig_core::DevrigError;

/// Errors from running a group file.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Devrig(#[from] DevrigError),
    #[error(transparent)]
    Action(#[from] ActionError),
}

impl RunError {
    /// Whether the group was rejected by pre-flight validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, RunError::Action(ActionError::Validation(_)))
    }
}

/// Read a group from `path`.
pub fn load_group(path: &Path) -> Result<ActionGroup, DevrigError> {
    let content = std::fs::read_to_string(path)?;
    let group = serde_json::from_str(&content)?;
    Ok(group)
}

/// Run the group stored at `path`.
///
/// With `write_back`, the group file is rewritten with the refreshed
/// outcome histories so the next run starts from them.
pub async fn run_group_file(
    executor: &ActionExecutor,
    path: &Path,
    write_back: bool,
) -> Result<RunReport, RunError> {
    let group = load_group(path)?;
    let original = group.clone();
    tracing::info!(path = %path.display(), group_id = %group.id, "Running action group");

    let report = executor.execute(group, &NoopObserver).await?;

    if write_back {
        let updated = ActionGroup {
            actions: report.actions.clone(),
            retry_actions: report
                .retry_actions
                .clone()
                .unwrap_or(original.retry_actions),
            ..original
        };
        let content = serde_json::to_string_pretty(&updated).map_err(DevrigError::from)?;
        std::fs::write(path, content).map_err(DevrigError::from)?;
        tracing::info!(path = %path.display(), "Outcome histories written back");
    }

    Ok(report)
}
