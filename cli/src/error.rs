//! Error types for the expense simulator CLI.

use expense_simulator_core_rs::{GenerationError, TargetError};
use thiserror::Error;

/// CLI result type alias.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error type.
#[derive(Error, Debug)]
pub enum CliError {
    /// IO error reading inputs or writing output.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Target sheet could not be parsed.
    #[error("Invalid targets: {0}")]
    Targets(#[from] TargetError),

    /// Generation run failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Bad combination of command-line arguments.
    #[error("Invalid arguments: {0}")]
    Args(String),
}
