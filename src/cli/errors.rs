//! CLI-specific error types
//!
//! All CLI errors are fatal: they end the process with a non-zero status.
//! Errors raised by individual operations are not CLI errors; they are
//! written to stdout as error responses and the loop continues.

use std::io;

use thiserror::Error;

use crate::core::CoreError;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file unreadable or invalid
    #[error("{}: {0}", CliError::CONFIG)]
    Config(String),

    /// stdin/stdout failure
    #[error("{}: {0}", CliError::IO)]
    Io(String),

    /// Async runtime could not be started
    #[error("{}: {0}", CliError::RUNTIME)]
    Runtime(String),

    /// A scripted operation failed
    #[error("{}: {0}", .0.code())]
    Operation(#[from] CoreError),
}

impl CliError {
    const CONFIG: &'static str = "SHOP_CLI_CONFIG_ERROR";
    const IO: &'static str = "SHOP_CLI_IO_ERROR";
    const RUNTIME: &'static str = "SHOP_CLI_RUNTIME_ERROR";

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => Self::CONFIG,
            Self::Io(_) => Self::IO,
            Self::Runtime(_) => Self::RUNTIME,
            Self::Operation(e) => e.code(),
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::Config(m) | Self::Io(m) | Self::Runtime(m) => m.clone(),
            Self::Operation(e) => e.to_string(),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}
