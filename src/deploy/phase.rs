// ABOUTME: Phase identifiers and per-phase outcome records.
// ABOUTME: A dispatch produces one PhaseRecord for every phase in its plan.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// One ordered step of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Build,
    StartInfrastructure,
    SettleInfrastructure,
    StartApplications,
    Teardown,
    Restart,
    Logs,
    Status,
    PruneImages,
    PruneVolumes,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Build => "build",
            Phase::StartInfrastructure => "start-infrastructure",
            Phase::SettleInfrastructure => "settle-infrastructure",
            Phase::StartApplications => "start-applications",
            Phase::Teardown => "teardown",
            Phase::Restart => "restart",
            Phase::Logs => "logs",
            Phase::Status => "status",
            Phase::PruneImages => "prune-images",
            Phase::PruneVolumes => "prune-volumes",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a phase did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// The phase had no services to act on.
    NoTargets,
    /// A phase it depends on did not succeed.
    DependencyFailed,
    /// The dispatch was interrupted before the phase started.
    Cancelled,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::NoTargets => "no targets",
            SkipReason::DependencyFailed => "dependency failed",
            SkipReason::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "kebab-case")]
pub enum PhaseOutcome {
    /// The backend ran and exited normally.
    Exited { code: i32 },
    /// The settle delay elapsed.
    Settled,
    Skipped { reason: SkipReason },
}

impl PhaseOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, PhaseOutcome::Exited { code: 0 } | PhaseOutcome::Settled)
    }

    /// A nonzero exit, or a skip caused by an earlier failure or cancellation.
    ///
    /// `Skipped(NoTargets)` is neither a success nor a failure.
    pub fn is_failure(&self) -> bool {
        match self {
            PhaseOutcome::Exited { code } => *code != 0,
            PhaseOutcome::Settled => false,
            PhaseOutcome::Skipped { reason } => *reason != SkipReason::NoTargets,
        }
    }
}

impl fmt::Display for PhaseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseOutcome::Exited { code: 0 } => f.write_str("ok"),
            PhaseOutcome::Exited { code } => write!(f, "exit {}", code),
            PhaseOutcome::Settled => f.write_str("settled"),
            PhaseOutcome::Skipped { reason } => write!(f, "skipped ({})", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseRecord {
    pub phase: Phase,
    /// Rendered invocation; absent for phases that run no command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(flatten)]
    pub outcome: PhaseOutcome,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
    /// Captured backend output, when output is buffered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl PhaseRecord {
    pub fn skipped(phase: Phase, reason: SkipReason) -> Self {
        Self {
            phase,
            command: None,
            outcome: PhaseOutcome::Skipped { reason },
            duration: Duration::ZERO,
            output: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_targets_is_not_a_failure() {
        let outcome = PhaseOutcome::Skipped {
            reason: SkipReason::NoTargets,
        };
        assert!(!outcome.succeeded());
        assert!(!outcome.is_failure());
    }

    #[test]
    fn dependency_skip_is_a_failure() {
        let outcome = PhaseOutcome::Skipped {
            reason: SkipReason::DependencyFailed,
        };
        assert!(outcome.is_failure());
    }

    #[test]
    fn nonzero_exit_is_a_failure() {
        assert!(PhaseOutcome::Exited { code: 2 }.is_failure());
        assert!(PhaseOutcome::Exited { code: 0 }.succeeded());
        assert!(PhaseOutcome::Settled.succeeded());
    }

    #[test]
    fn record_serializes_flat() {
        let record = PhaseRecord {
            phase: Phase::StartInfrastructure,
            command: Some("docker compose up".to_string()),
            outcome: PhaseOutcome::Exited { code: 1 },
            duration: Duration::from_secs(2),
            output: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["phase"], "start-infrastructure");
        assert_eq!(json["result"], "exited");
        assert_eq!(json["code"], 1);
        assert_eq!(json["duration"], "2s");
        assert!(json.get("output").is_none());
    }

    #[test]
    fn display_is_kebab_case() {
        assert_eq!(Phase::PruneVolumes.to_string(), "prune-volumes");
        assert_eq!(
            PhaseOutcome::Skipped {
                reason: SkipReason::Cancelled
            }
            .to_string(),
            "skipped (cancelled)"
        );
    }
}
