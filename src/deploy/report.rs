// ABOUTME: Deployment report aggregating phase outcomes and health results.
// ABOUTME: Built once at the end of a dispatch and read-only afterwards.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use super::orchestrator::PhaseLog;
use super::phase::PhaseRecord;
use crate::health::HealthReport;
use crate::invocation::Flags;
use crate::types::{EnvironmentId, Operation, ServiceName};

/// Overall result of a dispatch, derived from phase outcomes only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverallStatus {
    Success,
    /// Some phases succeeded and others failed or were skipped.
    PartialFailure,
    Failure,
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OverallStatus::Success => "success",
            OverallStatus::PartialFailure => "partial failure",
            OverallStatus::Failure => "failure",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeploymentReport {
    pub environment: EnvironmentId,
    pub project: String,
    pub operation: Operation,
    /// Requested subset; empty means every service.
    pub services: Vec<ServiceName>,
    pub flags: Flags,
    pub phases: Vec<PhaseRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<HealthReport>,
    pub warnings: Vec<String>,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl DeploymentReport {
    pub fn overall_status(&self) -> OverallStatus {
        let failed = self.phases.iter().any(|p| p.outcome.is_failure());
        let succeeded = self.phases.iter().any(|p| p.outcome.succeeded());

        match (failed, succeeded) {
            (false, _) => OverallStatus::Success,
            (true, true) => OverallStatus::PartialFailure,
            (true, false) => OverallStatus::Failure,
        }
    }

    pub fn is_success(&self) -> bool {
        self.overall_status() == OverallStatus::Success
    }
}

/// Collects the parts of a report as a dispatch progresses.
#[derive(Debug)]
pub struct ReportBuilder {
    environment: EnvironmentId,
    project: String,
    operation: Operation,
    services: Vec<ServiceName>,
    flags: Flags,
    started_at: DateTime<Utc>,
}

impl ReportBuilder {
    pub fn new(
        environment: EnvironmentId,
        project: impl Into<String>,
        operation: Operation,
        services: &[ServiceName],
        flags: Flags,
    ) -> Self {
        Self {
            environment,
            project: project.into(),
            operation,
            services: services.to_vec(),
            flags,
            started_at: Utc::now(),
        }
    }

    pub fn finish(
        self,
        log: PhaseLog,
        health: Option<HealthReport>,
        warnings: Vec<String>,
    ) -> DeploymentReport {
        DeploymentReport {
            environment: self.environment,
            project: self.project,
            operation: self.operation,
            services: self.services,
            flags: self.flags,
            phases: log.phases,
            health,
            warnings,
            cancelled: log.cancelled,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::{Phase, PhaseOutcome, SkipReason};
    use std::time::Duration;

    fn exited(phase: Phase, code: i32) -> PhaseRecord {
        PhaseRecord {
            phase,
            command: Some(format!("docker compose {}", phase)),
            outcome: PhaseOutcome::Exited { code },
            duration: Duration::from_millis(10),
            output: None,
        }
    }

    fn report(phases: Vec<PhaseRecord>) -> DeploymentReport {
        ReportBuilder::new(
            EnvironmentId::Dev,
            "app",
            Operation::Up,
            &[],
            Flags::default(),
        )
        .finish(
            PhaseLog {
                phases,
                cancelled: false,
            },
            None,
            Vec::new(),
        )
    }

    #[test]
    fn all_zero_exits_is_success() {
        let r = report(vec![
            exited(Phase::StartInfrastructure, 0),
            exited(Phase::StartApplications, 0),
        ]);
        assert_eq!(r.overall_status(), OverallStatus::Success);
    }

    #[test]
    fn app_failure_after_infra_is_partial() {
        let r = report(vec![
            exited(Phase::StartInfrastructure, 0),
            exited(Phase::StartApplications, 1),
        ]);
        assert_eq!(r.overall_status(), OverallStatus::PartialFailure);
    }

    #[test]
    fn infra_failure_with_skips_is_total_failure() {
        let r = report(vec![
            exited(Phase::StartInfrastructure, 1),
            PhaseRecord::skipped(Phase::SettleInfrastructure, SkipReason::DependencyFailed),
            PhaseRecord::skipped(Phase::StartApplications, SkipReason::DependencyFailed),
        ]);
        assert_eq!(r.overall_status(), OverallStatus::Failure);
    }

    #[test]
    fn no_target_skip_keeps_success() {
        let r = report(vec![
            exited(Phase::StartInfrastructure, 0),
            PhaseRecord::skipped(Phase::StartApplications, SkipReason::NoTargets),
        ]);
        assert!(r.is_success());
    }

    #[test]
    fn finish_stamps_after_start() {
        let r = report(Vec::new());
        assert!(r.finished_at >= r.started_at);
        assert!(r.is_success());
    }
}
