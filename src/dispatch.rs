// ABOUTME: Command dispatcher: validates a request, orchestrates it, and verifies health.
// ABOUTME: Every dispatch ends in one DeploymentReport or a pre-flight error.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::{Config, LoadedConfig, UnknownService};
use crate::deploy::{
    CancelSignal, DeploymentReport, OrchestrationError, Orchestrator, Phase, ReportBuilder,
};
use crate::diagnostics::{Diagnostics, Warning};
use crate::environment::{Environment, EnvironmentResolver, ResolveError};
use crate::health::{HealthProbe, HealthReport, HealthVerifier};
use crate::invocation::{BuildError, CommandBuilder, Flags};
use crate::runtime::{Backend, CaptureMode, ExecutionError, RuntimeInfo};
use crate::types::{EnvironmentId, InvalidEnvironment, Operation, ServiceName};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    InvalidEnvironment(#[from] InvalidEnvironment),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    UnknownService(#[from] UnknownService),

    #[error("{operation} is not allowed on {environment}: {reason}")]
    OperationNotAllowed {
        operation: Operation,
        environment: EnvironmentId,
        reason: String,
    },

    #[error(transparent)]
    Build(BuildError),

    /// The backend could not be launched; `partial` holds the phases that ran.
    #[error("{phase} phase aborted: {source}")]
    Execution {
        phase: Phase,
        source: ExecutionError,
        partial: Box<DeploymentReport>,
    },
}

impl From<BuildError> for DispatchError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::UnknownService(unknown) => DispatchError::UnknownService(unknown),
            other => DispatchError::Build(other),
        }
    }
}

/// Entry point tying resolution, orchestration and health verification together.
pub struct Dispatcher<B: Backend> {
    config: Config,
    base_dir: PathBuf,
    backend: B,
    builder: CommandBuilder,
    capture: CaptureMode,
    cancel: Option<CancelSignal>,
}

impl<B: Backend> Dispatcher<B> {
    pub fn new(loaded: LoadedConfig, runtime: RuntimeInfo, backend: B) -> Self {
        let builder = CommandBuilder::new(
            runtime,
            loaded.config.services.clone(),
            loaded.config.log_tail,
        );
        Self {
            config: loaded.config,
            base_dir: loaded.base_dir,
            backend,
            builder,
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

    /// Run `operation` against `environment`.
    ///
    /// Nonzero phase exits are reported in the returned report, not as errors.
    pub async fn dispatch(
        &self,
        environment: &str,
        operation: Operation,
        services: &[String],
        flags: Flags,
    ) -> Result<DeploymentReport, DispatchError> {
        let id: EnvironmentId = environment.parse()?;
        let services = self.parse_services(services)?;
        self.check_allowed(id, operation, &services)?;

        let mut diag = Diagnostics::default();
        let env = EnvironmentResolver::new(&self.config, &self.base_dir).resolve_id(id, &mut diag)?;

        tracing::info!(
            environment = %env.id,
            project = %env.project,
            "dispatching {}",
            operation
        );

        let report = ReportBuilder::new(env.id, env.project.as_str(), operation, &services, flags);

        let mut orchestrator =
            Orchestrator::new(&self.backend, &self.builder, self.config.settle_delay)
                .capture(self.capture);
        if let Some(signal) = &self.cancel {
            orchestrator = orchestrator.cancel_signal(signal.clone());
        }

        let log = match orchestrator
            .execute(&env, operation, &services, flags, &mut diag)
            .await
        {
            Ok(log) => log,
            Err((_, OrchestrationError::Build(e))) => return Err(e.into()),
            Err((log, OrchestrationError::Execution { phase, source })) => {
                let partial = report.finish(log, None, diag.into_messages());
                return Err(DispatchError::Execution {
                    phase,
                    source,
                    partial: Box::new(partial),
                });
            }
        };

        let health = if operation.runs_health_checks() && !log.cancelled {
            Some(self.verify_health(&env, &mut diag).await)
        } else {
            None
        };

        Ok(report.finish(log, health, diag.into_messages()))
    }

    /// Names that are malformed cannot be in the topology either.
    fn parse_services(&self, raw: &[String]) -> Result<Vec<ServiceName>, DispatchError> {
        let services = raw
            .iter()
            .map(|s| ServiceName::new(s).map_err(|_| UnknownService(s.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        self.builder.topology().check_services(&services)?;
        Ok(services)
    }

    fn check_allowed(
        &self,
        environment: EnvironmentId,
        operation: Operation,
        services: &[ServiceName],
    ) -> Result<(), DispatchError> {
        if operation != Operation::Clean {
            return Ok(());
        }

        let refuse = |reason: &str| DispatchError::OperationNotAllowed {
            operation,
            environment,
            reason: reason.to_string(),
        };

        let protected = self
            .config
            .environments
            .get(&environment)
            .is_some_and(|e| e.protected);
        if protected {
            return Err(refuse("environment is protected"));
        }
        if !services.is_empty() {
            return Err(refuse("clean always targets the whole project"));
        }
        Ok(())
    }

    async fn verify_health(
        &self,
        env: &Environment,
        diag: &mut Diagnostics,
    ) -> HealthReport {
        let mut probes = Vec::with_capacity(self.config.probes.len());
        for config in &self.config.probes {
            match HealthProbe::try_from(config) {
                Ok(probe) => probes.push(probe),
                Err(reason) => diag.warn(Warning::probe_skipped(reason)),
            }
        }

        HealthVerifier::new(&self.backend, &self.builder)
            .verify(env, &probes)
            .await
    }
}
