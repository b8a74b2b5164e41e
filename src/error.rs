use std::io;
use thiserror::Error;

/// Custom error type for jobwatch
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("GPU not available: {0}")]
    GpuNotAvailable(String),

    #[error("Telemetry query failed: {0}")]
    Telemetry(String),
}

/// Result type alias for jobwatch
pub type Result<T> = std::result::Result<T, WatchError>;

impl WatchError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        WatchError::Config(msg.into())
    }

    pub fn invalid_duration<S: Into<String>>(msg: S) -> Self {
        WatchError::InvalidDuration(msg.into())
    }

    pub fn gpu_not_available<S: Into<String>>(msg: S) -> Self {
        WatchError::GpuNotAvailable(msg.into())
    }

    pub fn telemetry<S: Into<String>>(msg: S) -> Self {
        WatchError::Telemetry(msg.into())
    }
}
