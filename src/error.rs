// ABOUTME: Application-wide error types for deckhand.
// ABOUTME: Maps every failure class to a distinct process exit code.

use std::path::PathBuf;
use thiserror::Error;

use crate::deploy::OverallStatus;
use crate::dispatch::DispatchError;
use crate::types::Operation;

/// A phase exited nonzero, or the dispatch was cancelled.
pub const EXIT_OPERATION_FAILED: i32 = 1;
/// Bad environment, missing configuration, unknown service, refused request.
pub const EXIT_ENVIRONMENT: i32 = 3;
/// The backend binary could not be launched or was killed.
pub const EXIT_EXECUTION: i32 = 4;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("cannot read configuration {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("{operation} finished with {status}")]
    OperationFailed {
        operation: Operation,
        status: OverallStatus,
    },

    #[error("{0} cancelled")]
    Cancelled(Operation),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ConfigNotFound(_)
            | Error::ConfigRead { .. }
            | Error::InvalidConfig(_)
            | Error::Yaml(_) => EXIT_ENVIRONMENT,
            Error::Dispatch(DispatchError::Execution { .. }) => EXIT_EXECUTION,
            Error::Dispatch(_) => EXIT_ENVIRONMENT,
            Error::AlreadyExists(_)
            | Error::OperationFailed { .. }
            | Error::Cancelled(_)
            | Error::Io(_) => EXIT_OPERATION_FAILED,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
