//! Error types for the stickflow CLI

use stickflow_engine::EngineError;
use stickflow_errors::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid input override: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::InvalidInput(_) => 2,
            CliError::Config(_) | CliError::Json(_) => 3,
            CliError::Engine(_) => 4,
        }
    }
}
