// ABOUTME: Execution backend error types with SNAFU pattern.
// ABOUTME: Covers failures to launch or finish a backend process, never nonzero exits.

use snafu::Snafu;

/// The backend could not run an invocation to a normal exit.
///
/// A process that exits with a nonzero code is not an error here; that is
/// an operation-level outcome reported through `ExecOutcome`.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ExecutionError {
    #[snafu(display("failed to launch {program}: {source}"))]
    Launch {
        program: String,
        source: std::io::Error,
    },

    #[snafu(display("failed waiting for {program}: {source}"))]
    Wait {
        program: String,
        source: std::io::Error,
    },

    #[snafu(display("{program} was terminated by a signal"))]
    Killed { program: String },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionErrorKind {
    /// Backend binary missing or not executable.
    NotFound,
    /// Launch failed for another reason (permissions, resource limits).
    LaunchFailed,
    /// Process was started but could not be awaited.
    WaitFailed,
    /// Process was killed before it could exit.
    Killed,
}

impl ExecutionError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ExecutionErrorKind {
        match self {
            ExecutionError::Launch { source, .. }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                ExecutionErrorKind::NotFound
            }
            ExecutionError::Launch { .. } => ExecutionErrorKind::LaunchFailed,
            ExecutionError::Wait { .. } => ExecutionErrorKind::WaitFailed,
            ExecutionError::Killed { .. } => ExecutionErrorKind::Killed,
        }
    }

    /// The program that failed.
    pub fn program(&self) -> &str {
        match self {
            ExecutionError::Launch { program, .. }
            | ExecutionError::Wait { program, .. }
            | ExecutionError::Killed { program } => program,
        }
    }
}
