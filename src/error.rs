//! Error types for cowork-bridge.
//!
//! Uses thiserror for derive macros. Errors raised below the execution bridge
//! are converted into failed `ExecutionResult`s at the bridge boundary; only
//! configuration and CLI paths surface them to the user directly.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for cowork operations.
#[derive(Error, Debug)]
pub enum CoworkError {
    /// User provided invalid arguments.
    #[error("{0}")]
    UserError(String),

    /// Configuration or routing rule file is unreadable or invalid.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// The agent process could not be spawned or supervised.
    #[error("{0}")]
    Invocation(String),

    /// The agent ran but did not succeed.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

impl CoworkError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            CoworkError::UserError(_) => exit_codes::USER_ERROR,
            CoworkError::ConfigError(_) => exit_codes::USER_ERROR,
            CoworkError::Invocation(_) => exit_codes::EXECUTION_FAILURE,
            CoworkError::ExecutionFailed(_) => exit_codes::EXECUTION_FAILURE,
        }
    }
}

/// Result type alias for cowork operations.
pub type Result<T> = std::result::Result<T, CoworkError>;
