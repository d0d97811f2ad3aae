// ABOUTME: Topology orchestrator sequencing phases for each operation.
// ABOUTME: Infrastructure starts and settles before applications; failures short-circuit dependents.

use std::time::{Duration, Instant};

use super::cancel::CancelSignal;
use super::error::OrchestrationError;
use super::phase::{Phase, PhaseOutcome, PhaseRecord, SkipReason};
use crate::diagnostics::{Diagnostics, Warning};
use crate::environment::Environment;
use crate::invocation::{CommandBuilder, Flags, Invocation, PruneTarget};
use crate::runtime::{Backend, CaptureMode, ExecOutcome};
use crate::types::{Operation, ServiceName};

/// Phases executed by one dispatch, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseLog {
    pub phases: Vec<PhaseRecord>,
    /// Set when a cancellation request skipped at least one phase.
    pub cancelled: bool,
}

impl PhaseLog {
    fn outcome_of(&self, phase: Phase) -> Option<&PhaseOutcome> {
        self.phases
            .iter()
            .find(|r| r.phase == phase)
            .map(|r| &r.outcome)
    }

    /// True when every listed phase that ran has succeeded.
    fn dependencies_met(&self, requires: &[Phase]) -> bool {
        requires
            .iter()
            .filter_map(|p| self.outcome_of(*p))
            .all(|o| o.succeeded() || *o == PhaseOutcome::Skipped { reason: SkipReason::NoTargets })
    }
}

/// Result type for an orchestration that may abort partway.
///
/// The error side carries every phase recorded before the abort.
pub type OrchestrationResult = Result<PhaseLog, (PhaseLog, OrchestrationError)>;

enum Action {
    Compose {
        operation: Operation,
        services: Vec<ServiceName>,
    },
    Settle,
    Prune(PruneTarget),
    /// Nothing selected; recorded as skipped.
    NoTargets,
}

struct Step {
    phase: Phase,
    action: Action,
    requires: &'static [Phase],
}

impl Step {
    fn compose(phase: Phase, operation: Operation, services: &[ServiceName]) -> Self {
        Self {
            phase,
            action: Action::Compose {
                operation,
                services: services.to_vec(),
            },
            requires: &[],
        }
    }

    fn requires(mut self, phases: &'static [Phase]) -> Self {
        self.requires = phases;
        self
    }
}

/// Sequences phases for an operation against one environment.
pub struct Orchestrator<'a, B: Backend> {
    backend: &'a B,
    builder: &'a CommandBuilder,
    settle_delay: Duration,
    capture: CaptureMode,
    cancel: Option<CancelSignal>,
}

impl<'a, B: Backend> Orchestrator<'a, B> {
    pub fn new(backend: &'a B, builder: &'a CommandBuilder, settle_delay: Duration) -> Self {
        Self {
            backend,
            builder,
            settle_delay,
            capture: CaptureMode::default(),
            cancel: None,
        }
    }

    pub fn capture(mut self, mode: CaptureMode) -> Self {
        self.capture = mode;
        self
    }

    pub fn cancel_signal(mut self, signal: CancelSignal) -> Self {
        self.cancel = Some(signal);
        self
    }

    /// Run every phase of `operation`.
    ///
    /// Unknown services fail before any invocation is built. A nonzero exit is
    /// recorded and skips only the phases that depend on it. A backend that
    /// cannot be launched aborts the remaining phases.
    pub async fn execute(
        &self,
        env: &Environment,
        operation: Operation,
        services: &[ServiceName],
        flags: Flags,
        diag: &mut Diagnostics,
    ) -> OrchestrationResult {
        let mut log = PhaseLog::default();

        if let Err(e) = self.builder.topology().check_services(services) {
            return Err((log, OrchestrationError::Build(e.into())));
        }

        let plan = self.plan(operation, services, flags, diag);
        tracing::debug!(
            "{} on {}: {} phase(s) planned",
            operation,
            env.id,
            plan.len()
        );

        for step in plan {
            if self.is_cancelled() {
                tracing::info!("cancelled before {} phase", step.phase);
                log.cancelled = true;
                log.phases
                    .push(PhaseRecord::skipped(step.phase, SkipReason::Cancelled));
                continue;
            }

            if !log.dependencies_met(step.requires) {
                tracing::info!("skipping {} phase: dependency failed", step.phase);
                log.phases
                    .push(PhaseRecord::skipped(step.phase, SkipReason::DependencyFailed));
                continue;
            }

            let record = match step.action {
                Action::Settle => self.settle(step.phase, &mut log).await,
                Action::Compose {
                    operation: op,
                    services,
                } => {
                    let invocation = match self.builder.build(env, op, &services, flags) {
                        Ok(inv) => inv,
                        Err(e) => return Err((log, e.into())),
                    };
                    self.run_phase(step.phase, op.is_read_only(), invocation)
                        .await
                }
                Action::Prune(target) => {
                    let invocation = self.builder.build_prune(env, target, flags);
                    self.run_phase(step.phase, false, invocation).await
                }
                Action::NoTargets => Ok(PhaseRecord::skipped(step.phase, SkipReason::NoTargets)),
            };

            match record {
                Ok(record) => log.phases.push(record),
                Err(e) => return Err((log, e)),
            }
        }

        Ok(log)
    }

    fn plan(
        &self,
        operation: Operation,
        services: &[ServiceName],
        flags: Flags,
        diag: &mut Diagnostics,
    ) -> Vec<Step> {
        let topology = self.builder.topology();

        match operation {
            Operation::Up => {
                let mut steps = Vec::with_capacity(4);
                if flags.build {
                    steps.push(Step::compose(Phase::Build, Operation::Build, services));
                }

                if topology.infrastructure.is_empty() {
                    diag.warn(Warning::no_targets("no infrastructure services declared"));
                } else {
                    steps.push(
                        Step::compose(
                            Phase::StartInfrastructure,
                            Operation::Up,
                            &topology.infrastructure,
                        )
                        .requires(&[Phase::Build]),
                    );
                    steps.push(Step {
                        phase: Phase::SettleInfrastructure,
                        action: Action::Settle,
                        requires: &[Phase::Build, Phase::StartInfrastructure],
                    });
                }

                // An empty target list would make compose start every service.
                let targets = topology.application_targets(services);
                let action = if targets.is_empty() {
                    diag.warn(Warning::no_targets(
                        "no application services selected; skipping application start",
                    ));
                    Action::NoTargets
                } else {
                    Action::Compose {
                        operation: Operation::Up,
                        services: targets,
                    }
                };
                steps.push(Step {
                    phase: Phase::StartApplications,
                    action,
                    requires: &[
                        Phase::Build,
                        Phase::StartInfrastructure,
                        Phase::SettleInfrastructure,
                    ],
                });
                steps
            }
            Operation::Build => vec![Step::compose(Phase::Build, operation, services)],
            Operation::Down => vec![Step::compose(Phase::Teardown, operation, services)],
            Operation::Restart => vec![Step::compose(Phase::Restart, operation, services)],
            Operation::Logs => vec![Step::compose(Phase::Logs, operation, services)],
            Operation::Status => vec![Step::compose(Phase::Status, operation, services)],
            Operation::Clean => {
                let mut steps = vec![
                    Step::compose(Phase::Teardown, Operation::Clean, &[]),
                    Step {
                        phase: Phase::PruneImages,
                        action: Action::Prune(PruneTarget::Images),
                        requires: &[Phase::Teardown],
                    },
                ];
                if flags.force {
                    steps.push(Step {
                        phase: Phase::PruneVolumes,
                        action: Action::Prune(PruneTarget::Volumes),
                        requires: &[Phase::Teardown],
                    });
                }
                steps
            }
        }
    }

    async fn run_phase(
        &self,
        phase: Phase,
        read_only: bool,
        invocation: Invocation,
    ) -> Result<PhaseRecord, OrchestrationError> {
        tracing::info!("{} phase: {}", phase, invocation);
        let started = Instant::now();

        let outcome = self
            .backend
            .run(&invocation, self.capture)
            .await
            .map_err(|source| OrchestrationError::Execution { phase, source })?;

        let duration = started.elapsed();
        if outcome.success() {
            tracing::info!("{} phase finished in {:.1}s", phase, duration.as_secs_f64());
        } else {
            tracing::warn!("{} phase exited with code {}", phase, outcome.exit_code);
        }

        Ok(PhaseRecord {
            phase,
            command: Some(invocation.to_string()),
            outcome: PhaseOutcome::Exited {
                code: outcome.exit_code,
            },
            duration,
            output: captured_output(&outcome, read_only),
        })
    }

    async fn settle(
        &self,
        phase: Phase,
        log: &mut PhaseLog,
    ) -> Result<PhaseRecord, OrchestrationError> {
        tracing::info!(
            "waiting {:.1}s for infrastructure to settle",
            self.settle_delay.as_secs_f64()
        );
        let started = Instant::now();

        let interrupted = match &self.cancel {
            Some(signal) => {
                tokio::select! {
                    _ = tokio::time::sleep(self.settle_delay) => false,
                    _ = signal.cancelled() => true,
                }
            }
            None => {
                tokio::time::sleep(self.settle_delay).await;
                false
            }
        };

        if interrupted {
            log.cancelled = true;
            return Ok(PhaseRecord::skipped(phase, SkipReason::Cancelled));
        }

        Ok(PhaseRecord {
            phase,
            command: None,
            outcome: PhaseOutcome::Settled,
            duration: started.elapsed(),
            output: None,
        })
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelSignal::is_cancelled)
    }
}

/// Buffered stdout for read-only phases; stderr for failed ones.
fn captured_output(outcome: &ExecOutcome, read_only: bool) -> Option<String> {
    let text = if read_only {
        &outcome.stdout
    } else if !outcome.success() {
        &outcome.stderr
    } else {
        return None;
    };

    if text.trim().is_empty() {
        None
    } else {
        Some(text.clone())
    }
}
