// ABOUTME: Test support utilities.
// ABOUTME: Provides a recording backend and temporary project fixtures.

use deckhand::config::{Config, LoadedConfig, ProbeConfig};
use deckhand::invocation::Invocation;
use deckhand::runtime::{
    Backend, CaptureMode, ExecOutcome, ExecutionError, RuntimeInfo, RuntimeType,
};
use deckhand::types::ServiceName;
use std::fs;
use std::sync::{Mutex, Once};
use std::time::Duration;
use tempfile::TempDir;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("deckhand=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

type Responder = Box<dyn Fn(&Invocation) -> Result<ExecOutcome, ExecutionError> + Send + Sync>;

/// Backend that records every invocation and answers from a script.
pub struct RecordingBackend {
    calls: Mutex<Vec<Invocation>>,
    respond: Responder,
}

#[allow(dead_code)]
impl RecordingBackend {
    /// Every invocation exits 0.
    pub fn healthy() -> Self {
        Self::scripted(|_| Ok(exit(0)))
    }

    pub fn scripted<F>(respond: F) -> Self
    where
        F: Fn(&Invocation) -> Result<ExecOutcome, ExecutionError> + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        }
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than health probe `exec`s.
    pub fn lifecycle_calls(&self) -> Vec<Invocation> {
        self.calls()
            .into_iter()
            .filter(|inv| !inv.contains("exec"))
            .collect()
    }

    pub fn probe_calls(&self) -> Vec<Invocation> {
        self.calls()
            .into_iter()
            .filter(|inv| inv.contains("exec"))
            .collect()
    }
}

#[async_trait::async_trait]
impl Backend for RecordingBackend {
    async fn run(
        &self,
        invocation: &Invocation,
        _mode: CaptureMode,
    ) -> Result<ExecOutcome, ExecutionError> {
        self.calls.lock().unwrap().push(invocation.clone());
        (self.respond)(invocation)
    }
}

#[allow(dead_code)]
pub fn exit(code: i32) -> ExecOutcome {
    ExecOutcome {
        exit_code: code,
        ..ExecOutcome::default()
    }
}

#[allow(dead_code)]
pub fn launch_failure(program: &str) -> ExecutionError {
    ExecutionError::Launch {
        program: program.to_string(),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
    }
}

#[allow(dead_code)]
pub fn svc(name: &str) -> ServiceName {
    ServiceName::new(name).unwrap()
}

#[allow(dead_code)]
pub fn docker() -> RuntimeInfo {
    RuntimeInfo {
        runtime_type: RuntimeType::Docker,
        binary: "docker".to_string(),
    }
}

#[allow(dead_code)]
/// A project directory with compose files for every environment and a
/// variable file for dev and prod only.
pub struct Project {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl Project {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        for env in ["dev", "staging", "prod"] {
            fs::write(
                dir.path().join(format!("docker-compose.{}.yml", env)),
                "services: {}\n",
            )
            .unwrap();
        }
        fs::write(dir.path().join(".env.dev"), "LOG_LEVEL=debug\n").unwrap();
        fs::write(dir.path().join(".env.prod"), "LOG_LEVEL=warn\n").unwrap();
        Self { dir }
    }

    /// Built-in topology with no settle delay and one exec probe per critical service.
    pub fn config(&self) -> Config {
        let mut config = Config::builtin();
        config.project = Some("shop".to_string());
        config.settle_delay = Duration::ZERO;
        config.probes = vec![
            ProbeConfig::exec(svc("postgres"), &["pg_isready"]),
            ProbeConfig::exec(svc("redis"), &["redis-cli", "ping"]),
            ProbeConfig::exec(svc("core-business-service"), &["true"]),
            ProbeConfig::exec(svc("api-gateway"), &["true"]),
        ];
        config
    }

    pub fn loaded(&self, config: Config) -> LoadedConfig {
        LoadedConfig {
            config,
            base_dir: self.dir.path().to_path_buf(),
            source: None,
        }
    }
}
