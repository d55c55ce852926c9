use thiserror::Error;

/// Top-level error type for the devrig workspace.
///
/// Subsystem crates keep their own error enums and convert into this one
/// at the composition root, so `?` works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DevrigError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for DevrigError {
    fn from(err: toml::de::Error) -> Self {
        DevrigError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for DevrigError {
    fn from(err: serde_json::Error) -> Self {
        DevrigError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for devrig operations.
pub type Result<T> = std::result::Result<T, DevrigError>;
