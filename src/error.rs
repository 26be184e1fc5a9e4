//! Error types for the sales_forecast crate

use thiserror::Error;

/// Custom error types for the sales_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// No usable rows survived CSV parsing
    #[error("Parse error: {0}")]
    Parse(String),

    /// The observation set handed to the encoder was unusable
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Training failed (shape mismatch or numerical instability)
    #[error("Training error: {0}")]
    Training(String),

    /// A training run was cancelled before completion
    #[error("Training cancelled")]
    Cancelled,

    /// Error from invalid parameters or mismatched arguments
    #[error("Validation error: {0}")]
    Validation(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
