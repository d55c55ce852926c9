//! Action execution and reliability engine for devrig.
//!
//! Binds user input into device action parameters, dispatches action groups
//! sequentially with halt-on-failure and retry fallback, and tracks a bounded
//! outcome history per action to derive a confidence score.

pub mod binder;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod observer;
pub mod reliability;
pub mod timing;
pub mod types;
pub mod validation;

pub use binder::{bind, BoundParams};
pub use dispatch::{DeviceControl, HttpDeviceControl};
pub use error::{ActionError, DispatchError, ValidationError};
pub use executor::ActionExecutor;
pub use observer::{NoopObserver, OutcomeObserver};
pub use reliability::{confidence, record_outcome, ConfidenceScore, MAX_OUTCOME_HISTORY};
pub use types::{
    Action, ActionGroup, Command, DispatchResponse, EntryKind, GroupOutcome, RunPhase, RunReport,
    Transcript, TranscriptEntry,
};
pub use validation::{is_runnable, validate, validation_errors};
