// ABOUTME: Command builder turning (environment, operation, services, flags) into invocations.
// ABOUTME: Pure and deterministic; it validates service names but never executes anything.

use serde::Serialize;
use thiserror::Error;

use super::Invocation;
use crate::config::{Topology, UnknownService};
use crate::environment::Environment;
use crate::runtime::{RuntimeInfo, RuntimeType};
use crate::types::{Operation, ServiceName};

/// Label compose puts on every resource it creates.
const PROJECT_LABEL: &str = "com.docker.compose.project";

/// Modifier flags for a dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Flags {
    /// Disable build caches; remove volumes on teardown.
    pub force: bool,
    /// Ask the backend for diagnostic output.
    pub verbose: bool,
    /// Build images before `up`.
    pub build: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error(transparent)]
    UnknownService(#[from] UnknownService),

    #[error("probe command for {0} cannot be empty")]
    EmptyCommand(ServiceName),
}

/// Project-scoped resources removed by `clean`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneTarget {
    Images,
    Volumes,
}

impl PruneTarget {
    fn resource(&self) -> &'static str {
        match self {
            PruneTarget::Images => "image",
            PruneTarget::Volumes => "volume",
        }
    }
}

/// Builds compose invocations for one backend and topology.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    runtime: RuntimeInfo,
    topology: Topology,
    log_tail: u32,
}

impl CommandBuilder {
    pub fn new(runtime: RuntimeInfo, topology: Topology, log_tail: u32) -> Self {
        Self {
            runtime,
            topology,
            log_tail,
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Build the invocation for a single-step operation.
    ///
    /// An empty `services` slice targets every service in the topology file.
    /// Unknown names fail before anything is constructed. For `Clean` this
    /// is the teardown step; pruning comes from [`CommandBuilder::build_prune`].
    pub fn build(
        &self,
        env: &Environment,
        operation: Operation,
        services: &[ServiceName],
        flags: Flags,
    ) -> Result<Invocation, BuildError> {
        self.topology.check_services(services)?;

        let compose = self.compose(env, flags);
        let tail = self.log_tail.to_string();
        let invocation = match operation {
            Operation::Build => {
                let inv = compose.arg("build");
                if flags.force {
                    inv.arg("--no-cache")
                } else {
                    inv
                }
            }
            Operation::Up => compose.args(["up", "--detach"]),
            Operation::Down => {
                let mut inv = compose.arg("down");
                if flags.force {
                    inv = inv.arg("--volumes");
                }
                if services.is_empty() {
                    inv = inv.arg("--remove-orphans");
                }
                inv
            }
            Operation::Restart => compose.arg("restart"),
            Operation::Logs => compose.args(["logs", "--no-color", "--tail", tail.as_str()]),
            Operation::Status => compose.args(["ps", "--all"]),
            Operation::Clean => {
                let inv = compose.args(["down", "--remove-orphans", "--rmi", "local"]);
                if flags.force {
                    inv.arg("--volumes")
                } else {
                    inv
                }
            }
        };

        Ok(invocation.args(services.iter().map(ServiceName::to_string)))
    }

    /// Prune images or volumes labelled with the environment's project.
    pub fn build_prune(&self, env: &Environment, target: PruneTarget, flags: Flags) -> Invocation {
        self.engine(env, flags).args([
            target.resource().to_string(),
            "prune".to_string(),
            "--force".to_string(),
            "--filter".to_string(),
            format!("label={}={}", PROJECT_LABEL, env.project),
        ])
    }

    /// Run a probe command inside a service container.
    pub fn build_exec(
        &self,
        env: &Environment,
        service: &ServiceName,
        command: &[String],
    ) -> Result<Invocation, BuildError> {
        self.topology
            .check_services(std::slice::from_ref(service))?;
        if command.is_empty() {
            return Err(BuildError::EmptyCommand(service.clone()));
        }

        Ok(self
            .compose(env, Flags::default())
            .args(["exec", "-T", service.as_str()])
            .args(command.iter().cloned()))
    }

    /// `<binary> [debug] compose -f <topology> [--env-file <vars>] -p <project>`
    fn compose(&self, env: &Environment, flags: Flags) -> Invocation {
        let mut inv = self
            .engine(env, flags)
            .arg("compose")
            .arg("-f")
            .arg(env.topology_file.to_string_lossy());

        if let Some(vars) = &env.variable_file {
            inv = inv.arg("--env-file").arg(vars.to_string_lossy());
        }

        inv.arg("-p").arg(env.project.as_str())
    }

    fn engine(&self, env: &Environment, flags: Flags) -> Invocation {
        let inv = Invocation::new(self.runtime.binary.as_str(), env.working_dir.as_path())
            .envs(&env.variables);

        if !flags.verbose {
            return inv;
        }

        match self.runtime.runtime_type {
            RuntimeType::Docker => inv.arg("--debug"),
            RuntimeType::Podman => inv.args(["--log-level", "debug"]),
        }
    }
}
