//! Error types for the scenario pipeline and CLI.

use thiserror::Error;

/// Result alias used across the CLI crate.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Simulation input rejected
    #[error("Simulation error: {0}")]
    Simulation(#[from] synth_core::SimulationError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Report serialisation error
    #[error("Serialisation error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid command-line argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
