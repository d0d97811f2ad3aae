// ABOUTME: Lifecycle operations a dispatch can perform.
// ABOUTME: Exhaustive matching on this enum replaces string-based command dispatch.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A high-level lifecycle intent for one environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Build,
    Up,
    Down,
    Restart,
    Logs,
    Status,
    Clean,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Build => "build",
            Operation::Up => "up",
            Operation::Down => "down",
            Operation::Restart => "restart",
            Operation::Logs => "logs",
            Operation::Status => "status",
            Operation::Clean => "clean",
        }
    }

    /// Whether a health verification pass follows this operation.
    ///
    /// Health is meaningless mid-build or after teardown.
    pub fn runs_health_checks(&self) -> bool {
        match self {
            Operation::Up | Operation::Status | Operation::Restart => true,
            Operation::Build | Operation::Down | Operation::Logs | Operation::Clean => false,
        }
    }

    /// Read-only operations never change container state.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Operation::Logs | Operation::Status)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_follows_up_status_and_restart_only() {
        assert!(Operation::Up.runs_health_checks());
        assert!(Operation::Status.runs_health_checks());
        assert!(Operation::Restart.runs_health_checks());
        assert!(!Operation::Build.runs_health_checks());
        assert!(!Operation::Down.runs_health_checks());
        assert!(!Operation::Logs.runs_health_checks());
        assert!(!Operation::Clean.runs_health_checks());
    }

    #[test]
    fn read_only_operations() {
        assert!(Operation::Logs.is_read_only());
        assert!(Operation::Status.is_read_only());
        assert!(!Operation::Up.is_read_only());
    }
}
