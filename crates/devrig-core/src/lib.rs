pub mod config;
pub mod error;

pub use config::{DevrigConfig, FinalWaitPolicy};
pub use error::{DevrigError, Result};
