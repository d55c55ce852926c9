//! CLI argument definitions for the devrig binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 3040;

/// devrig - runs device action groups with retry fallback and tracks how
/// reliable each action is.
#[derive(Parser, Debug)]
#[command(name = "devrig", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log level or filter directive (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute an action group from a JSON file and print its transcript.
    Run {
        /// Path to the action group JSON.
        group: PathBuf,

        /// Write refreshed outcome histories back to the group file.
        #[arg(short = 'w', long = "write-back")]
        write_back: bool,

        /// Print the full run report as JSON instead of the transcript.
        #[arg(long = "json")]
        json: bool,
    },
    /// Start the REST API server.
    Serve {
        /// API server port.
        #[arg(short = 'p', long = "port")]
        port: Option<u16>,
    },
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > DEVRIG_CONFIG env var > ~/.devrig/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        self.config_path_from(std::env::var("DEVRIG_CONFIG").ok())
    }

    fn config_path_from(&self, env_path: Option<String>) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Some(p) = env_path {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the API server port.
    ///
    /// Priority: --port flag > DEVRIG_PORT env var > config file value > 3040.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        self.port_from(std::env::var("DEVRIG_PORT").ok(), config_port)
    }

    fn port_from(&self, env_port: Option<String>, config_port: u16) -> u16 {
        if let Command::Serve { port: Some(p) } = self.command {
            return p;
        }
        if let Some(p) = env_port.and_then(|val| val.parse::<u16>().ok()) {
            return p;
        }
        if config_port != 0 {
            return config_port;
        }
        DEFAULT_PORT
    }

    /// Resolve the log filter directive.
    ///
    /// Priority: --log-level flag > RUST_LOG env var > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level_from(std::env::var("RUST_LOG").ok(), config_level)
    }

    fn log_level_from(&self, env_level: Option<String>, config_level: &str) -> String {
        self.log_level
            .clone()
            .or(env_level.filter(|level| !level.trim().is_empty()))
            .unwrap_or_else(|| config_level.to_string())
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".devrig").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".devrig").join("config.toml");
    }
    PathBuf::from("config.toml")
}
