use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Top-level configuration for devrig.
///
/// Loaded from `~/.devrig/config.toml` by default. Every section falls back
/// to its defaults when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevrigConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

impl DevrigConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DevrigConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Test-execution backend that owns the devices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the backend, without a trailing path.
    pub base_url: String,
    /// Host the device is attached to.
    pub host_name: String,
    /// Device addressed by every dispatched action.
    pub device_id: String,
    /// Per-request timeout. Unset means dispatch waits indefinitely.
    pub request_timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5109".to_string(),
            host_name: "localhost".to_string(),
            device_id: "device1".to_string(),
            request_timeout_secs: None,
        }
    }
}

/// When the group-level final wait is observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalWaitPolicy {
    /// Only after a run whose overall outcome is success.
    #[default]
    OnSuccess,
    /// After every run regardless of outcome.
    Always,
}

/// Action executor settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub final_wait_policy: FinalWaitPolicy,
}

/// REST API server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Address to bind, localhost only by default.
    pub bind_address: String,
    /// Port to listen on. 0 means "use the built-in default".
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 3040,
        }
    }
}
