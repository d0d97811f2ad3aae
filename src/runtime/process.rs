// ABOUTME: Child-process execution backend built on tokio::process.
// ABOUTME: Distinguishes normal exits from launch failures and signal termination.

use async_trait::async_trait;
use snafu::ResultExt;
use std::process::Stdio;
use tokio::process::Command;

use super::backend::{Backend, CaptureMode, ExecOutcome};
use super::error::{ExecutionError, LaunchSnafu, WaitSnafu};
use crate::invocation::Invocation;

/// Runs invocations as local child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessBackend;

impl ProcessBackend {
    pub fn new() -> Self {
        Self
    }

    fn command(invocation: &Invocation) -> Command {
        let mut command = Command::new(invocation.program());
        command
            .args(invocation.arguments())
            .current_dir(invocation.working_dir())
            .envs(invocation.env())
            .stdin(Stdio::null())
            .kill_on_drop(true);
        // Keep terminal SIGINT away from the child so an interrupt only
        // stops the dispatch once the running phase has finished.
        #[cfg(unix)]
        command.process_group(0);
        command
    }
}

#[async_trait]
impl Backend for ProcessBackend {
    async fn run(
        &self,
        invocation: &Invocation,
        mode: CaptureMode,
    ) -> Result<ExecOutcome, ExecutionError> {
        let program = invocation.program().to_string();
        tracing::debug!("running: {}", invocation);

        let mut command = Self::command(invocation);

        let (status, stdout, stderr) = match mode {
            CaptureMode::Stream => {
                let mut child = command
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .spawn()
                    .context(LaunchSnafu {
                        program: program.clone(),
                    })?;
                let status = child.wait().await.context(WaitSnafu {
                    program: program.clone(),
                })?;
                (status, String::new(), String::new())
            }
            CaptureMode::Buffer => {
                let output = command
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .output()
                    .await
                    .context(LaunchSnafu {
                        program: program.clone(),
                    })?;
                (
                    output.status,
                    String::from_utf8_lossy(&output.stdout).into_owned(),
                    String::from_utf8_lossy(&output.stderr).into_owned(),
                )
            }
        };

        // No exit code means the process was terminated by a signal.
        let exit_code = status.code().ok_or(ExecutionError::Killed { program })?;

        if exit_code != 0 {
            tracing::debug!("{} exited with code {}", invocation.program(), exit_code);
        }

        Ok(ExecOutcome {
            exit_code,
            stdout,
            stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn buffered_run_captures_stdout() {
        let inv = Invocation::new("sh", "/").args(["-c", "echo hello"]);
        let outcome = ProcessBackend::new()
            .run(&inv, CaptureMode::Buffer)
            .await
            .unwrap();
        assert!(outcome.success());
        assert_eq!(outcome.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn nonzero_exit_is_an_outcome_not_an_error() {
        let inv = Invocation::new("sh", "/").args(["-c", "echo oops >&2; exit 3"]);
        let outcome = ProcessBackend::new()
            .run(&inv, CaptureMode::Buffer)
            .await
            .unwrap();
        assert_eq!(outcome.exit_code, 3);
        assert!(outcome.stderr.contains("oops"));
    }

    #[tokio::test]
    async fn missing_binary_is_execution_error() {
        let inv = Invocation::new("deckhand-nonexistent-binary-12345", "/");
        let err = ProcessBackend::new()
            .run(&inv, CaptureMode::Buffer)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), super::super::ExecutionErrorKind::NotFound);
    }

    #[tokio::test]
    async fn signal_termination_is_execution_error() {
        let inv = Invocation::new("sh", "/").args(["-c", "kill -9 $$"]);
        let err = ProcessBackend::new()
            .run(&inv, CaptureMode::Buffer)
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Killed { .. }));
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn child_leads_its_own_process_group() {
        // Fields 1 and 5 of /proc/<pid>/stat are the pid and process group.
        let inv = Invocation::new("sh", "/").args(["-c", "cut -d' ' -f1,5 /proc/$$/stat"]);
        let outcome = ProcessBackend::new()
            .run(&inv, CaptureMode::Buffer)
            .await
            .unwrap();

        let fields: Vec<&str> = outcome.stdout.split_whitespace().collect();
        assert_eq!(fields.len(), 2, "unexpected output: {:?}", outcome.stdout);
        assert_eq!(fields[0], fields[1]);
    }

    #[tokio::test]
    async fn environment_is_passed_to_child() {
        let mut vars = std::collections::BTreeMap::new();
        vars.insert("DECKHAND_PROBE".to_string(), "42".to_string());
        let inv = Invocation::new("sh", "/")
            .args(["-c", "echo $DECKHAND_PROBE"])
            .envs(&vars);
        let outcome = ProcessBackend::new()
            .run(&inv, CaptureMode::Buffer)
            .await
            .unwrap();
        assert_eq!(outcome.stdout.trim(), "42");
    }
}
