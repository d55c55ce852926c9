//! HTTP device control against the test-execution backend.

use std::time::Duration;

use async_trait::async_trait;
use devrig_core::config::BackendConfig;
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::dispatch::DeviceControl;
use crate::error::DispatchError;
use crate::types::DispatchResponse;

const EXECUTE_PATH: &str = "/device/actions/execute";

/// Dispatches actions as `POST {base_url}/device/actions/execute`.
pub struct HttpDeviceControl {
    client: Client,
    endpoint: String,
    host_name: String,
    device_id: String,
}

#[derive(Debug, Serialize)]
struct ExecuteRequest<'a> {
    host_name: &'a str,
    device_id: &'a str,
    command: &'a str,
    params: &'a Map<String, Value>,
    wait_time: u64,
}

impl HttpDeviceControl {
    /// Build a client for the backend described by `config`.
    ///
    /// No request timeout is set unless `request_timeout_secs` is configured.
    pub fn new(config: &BackendConfig) -> Result<Self, DispatchError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|err| DispatchError::Client(err.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", config.base_url.trim_end_matches('/'), EXECUTE_PATH),
            host_name: config.host_name.clone(),
            device_id: config.device_id.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DeviceControl for HttpDeviceControl {
    async fn execute(
        &self,
        command: &str,
        params: &Map<String, Value>,
        wait_time_ms: u64,
    ) -> Result<DispatchResponse, DispatchError> {
        let body = ExecuteRequest {
            host_name: &self.host_name,
            device_id: &self.device_id,
            command,
            params,
            wait_time: wait_time_ms,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|err| DispatchError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<response unavailable>".to_string());
            return Err(DispatchError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        response
            .json::<DispatchResponse>()
            .await
            .map_err(|err| DispatchError::Decode(err.to_string()))
    }
}
