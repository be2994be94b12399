//! Error types for Playcast.

use thiserror::Error;

/// Main error type for Playcast operations.
#[derive(Error, Debug)]
pub enum PlaycastError {
    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Shader compilation error: {0}")]
    Shader(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Playcast operations.
pub type Result<T> = std::result::Result<T, PlaycastError>;
