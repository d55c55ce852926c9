//! Device-control dispatch capability.
//!
//! Defines the `DeviceControl` async trait the executor sends every action
//! through, and the HTTP implementation that talks to the test backend.

pub mod http;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::DispatchError;
use crate::types::DispatchResponse;

pub use http::HttpDeviceControl;

/// Something that can execute a single device command.
///
/// Implementations report backend-level failure as `success: false` and
/// transport-level failure as `Err`; the executor treats both as a failed
/// action.
#[async_trait]
pub trait DeviceControl: Send + Sync {
    /// Execute `command` with already-bound `params`.
    ///
    /// `wait_time_ms` is a hint for backends that wait on the device side.
    async fn execute(
        &self,
        command: &str,
        params: &Map<String, Value>,
        wait_time_ms: u64,
    ) -> Result<DispatchResponse, DispatchError>;
}
