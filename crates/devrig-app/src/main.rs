//! devrig application binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize tracing
//! 3. Build the HTTP device control and the executor
//! 4. Run one group file, or serve the REST API

mod cli;
mod run;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use devrig_action::{ActionExecutor, HttpDeviceControl};
use devrig_api::{routes, AppState};
use devrig_core::{DevrigConfig, DevrigError};

use crate::cli::{CliArgs, Command};

const EXIT_FAILED: u8 = 1;
const EXIT_NOT_RUNNABLE: u8 = 2;

fn build_executor(config: &DevrigConfig) -> Result<ActionExecutor, DevrigError> {
    let device = HttpDeviceControl::new(&config.backend)
        .map_err(|e| DevrigError::Backend(e.to_string()))?;
    tracing::info!(endpoint = %device.endpoint(), "Device backend configured");
    Ok(ActionExecutor::new(Arc::new(device))
        .with_final_wait_policy(config.executor.final_wait_policy))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Config, before tracing so its log level can apply.
    let config_file = args.resolve_config_path();
    let loaded = DevrigConfig::load(&config_file);
    let mut config = loaded.as_ref().cloned().unwrap_or_default();

    // Tracing.
    let filter = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&filter)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match loaded {
        Ok(_) => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Err(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config, using defaults"
        ),
    }

    let executor = match build_executor(&config) {
        Ok(executor) => executor,
        Err(e) => {
            tracing::error!(error = %e, "Failed to set up device backend");
            return ExitCode::from(EXIT_FAILED);
        }
    };

    match args.command {
        Command::Run {
            ref group,
            write_back,
            json,
        } => match run::run_group_file(&executor, group, write_back).await {
            Ok(report) => {
                if json {
                    match serde_json::to_string_pretty(&report) {
                        Ok(text) => println!("{}", text),
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to serialize run report");
                            return ExitCode::from(EXIT_FAILED);
                        }
                    }
                } else {
                    println!("{}", report.transcript);
                }
                if report.succeeded() {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::from(EXIT_FAILED)
                }
            }
            Err(e) if e.is_validation() => {
                eprintln!("{}", e);
                ExitCode::from(EXIT_NOT_RUNNABLE)
            }
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::from(EXIT_FAILED)
            }
        },
        Command::Serve { .. } => {
            config.api.port = args.resolve_port(config.api.port);
            tracing::info!("Starting devrig v{}", env!("CARGO_PKG_VERSION"));

            let state = AppState::new(config.clone(), executor);
            match routes::start_server(&config, state).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    tracing::error!(error = %e, "API server stopped");
                    ExitCode::from(EXIT_FAILED)
                }
            }
        }
    }
}
