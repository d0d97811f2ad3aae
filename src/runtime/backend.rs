// ABOUTME: Execution backend trait and outcome types.
// ABOUTME: The adapter runs invocations and reports exit status; it never retries or decides.

use async_trait::async_trait;

use super::error::ExecutionError;
use crate::invocation::Invocation;

/// How backend output reaches the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureMode {
    /// Inherit stdout/stderr so output streams live.
    #[default]
    Stream,
    /// Buffer stdout/stderr and return them in the outcome.
    Buffer,
}

/// A process that ran to a normal exit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecOutcome {
    pub exit_code: i32,
    /// Empty in [`CaptureMode::Stream`].
    pub stdout: String,
    /// Empty in [`CaptureMode::Stream`].
    pub stderr: String,
}

impl ExecOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs invocations against the platform lifecycle tool.
///
/// Implementations report a nonzero exit through `Ok(ExecOutcome)` and
/// reserve `Err` for processes that could not be launched or were killed.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn run(
        &self,
        invocation: &Invocation,
        mode: CaptureMode,
    ) -> Result<ExecOutcome, ExecutionError>;
}

#[async_trait]
impl<B: Backend + ?Sized> Backend for &B {
    async fn run(
        &self,
        invocation: &Invocation,
        mode: CaptureMode,
    ) -> Result<ExecOutcome, ExecutionError> {
        (**self).run(invocation, mode).await
    }
}

#[async_trait]
impl<B: Backend + ?Sized> Backend for std::sync::Arc<B> {
    async fn run(
        &self,
        invocation: &Invocation,
        mode: CaptureMode,
    ) -> Result<ExecOutcome, ExecutionError> {
        (**self).run(invocation, mode).await
    }
}
