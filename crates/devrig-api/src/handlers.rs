//! Route handler functions for all API endpoints.
//!
//! Each handler extracts its input via axum extractors, calls into the
//! shared executor and returns a JSON response.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use devrig_action::{validation_errors, ActionGroup, RunPhase, RunReport};
use devrig_core::config::DevrigConfig;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::error::ApiError;
use crate::events::BroadcastObserver;
use crate::state::AppState;

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub runnable: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub group_id: String,
    pub phase: RunPhase,
}

// =============================================================================
// Handler functions
// =============================================================================

/// GET /health - liveness and uptime.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// POST /groups/validate - check a group without running it.
pub async fn validate_group(Json(group): Json<ActionGroup>) -> Json<ValidateResponse> {
    let errors: Vec<String> = validation_errors(&group)
        .iter()
        .map(ToString::to_string)
        .collect();
    Json(ValidateResponse {
        runnable: errors.is_empty(),
        errors,
    })
}

/// POST /groups/run - execute a group and return its report.
///
/// Outcome updates are published on the event stream while the run is in
/// progress. The run is spawned onto its own task, so a client disconnect
/// does not stop it.
pub async fn run_group(
    State(state): State<AppState>,
    Json(group): Json<ActionGroup>,
) -> Result<Json<RunReport>, ApiError> {
    if group.id.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Group id must not be empty".to_string(),
        ));
    }

    let executor = Arc::clone(&state.executor);
    let observer = BroadcastObserver::new(group.id.clone(), state.event_tx.clone());
    let run = tokio::spawn(async move { executor.execute(group, &observer).await });

    let report = run
        .await
        .map_err(|e| ApiError::Internal(format!("Run task failed: {}", e)))??;
    Ok(Json(report))
}

/// GET /groups/{id}/status - current run phase of a group.
pub async fn group_status(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> Json<StatusResponse> {
    let phase = state.executor.status(&group_id);
    Json(StatusResponse { group_id, phase })
}

/// GET /groups/events - SSE stream of outcome-history updates.
pub async fn group_events(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>> + Send> {
    let rx = state.event_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => Event::default().event("outcome").json_data(&event).ok().map(Ok),
        Err(err) => {
            tracing::warn!(error = %err, "Outcome event subscriber lagged");
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

/// GET /config - current configuration.
pub async fn get_config(State(state): State<AppState>) -> Result<Json<DevrigConfig>, ApiError> {
    let config = state
        .config
        .lock()
        .map_err(|e| ApiError::Internal(format!("Config lock poisoned: {}", e)))?;
    Ok(Json(config.clone()))
}
