//! devrig API crate - axum HTTP server over the action engine.
//!
//! Exposes group validation, execution, run status and a live SSE stream of
//! outcome-history updates.

pub mod error;
pub mod events;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use events::{ActionListKind, BroadcastObserver, OutcomeEvent};
pub use routes::{create_router, start_server};
pub use state::AppState;
