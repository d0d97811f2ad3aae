// ABOUTME: Error types for topology orchestration.
// ABOUTME: Only invalid targets and backend launch failures abort a dispatch.

use super::phase::Phase;
use crate::invocation::BuildError;
use crate::runtime::ExecutionError;

/// Errors that stop the orchestrator before its plan completes.
///
/// A phase that exits nonzero is not an error; it is recorded in the phase log.
#[derive(Debug, thiserror::Error)]
pub enum OrchestrationError {
    /// The invocation could not be constructed.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The backend could not be launched or was killed during a phase.
    #[error("{phase} phase aborted: {source}")]
    Execution {
        phase: Phase,
        #[source]
        source: ExecutionError,
    },
}
