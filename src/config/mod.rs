// ABOUTME: Configuration types and parsing for deckhand.yml.
// ABOUTME: Handles YAML parsing, discovery, validation, and the built-in topology.

mod env_value;
mod environment;
mod init;
mod log_level;
mod probe;
mod topology;

pub use env_value::{EnvValue, MissingEnvVar, resolve_env_map};
pub use environment::EnvironmentConfig;
pub use init::init_config;
pub use log_level::LogLevel;
pub use probe::{ProbeCheck, ProbeConfig};
pub use topology::{ServiceRole, Topology, UnknownService};

use crate::error::{Error, Result};
use crate::runtime::RuntimeConfig;
use crate::types::{EnvironmentId, ServiceName};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "deckhand.yml";
pub const CONFIG_FILENAME_ALT: &str = "deckhand.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".deckhand/config.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Compose project name; defaults to the project directory name.
    #[serde(default)]
    pub project: Option<String>,

    #[serde(default)]
    pub default_environment: EnvironmentId,

    #[serde(default)]
    pub backend: RuntimeConfig,

    /// Fixed wait between starting infrastructure and application services.
    #[serde(default = "default_settle_delay", with = "humantime_serde")]
    pub settle_delay: Duration,

    /// Lines shown per service by `logs`.
    #[serde(default = "default_log_tail")]
    pub log_tail: u32,

    #[serde(default = "Topology::builtin")]
    pub services: Topology,

    #[serde(default = "default_environments")]
    pub environments: BTreeMap<EnvironmentId, EnvironmentConfig>,

    #[serde(default)]
    pub probes: Vec<ProbeConfig>,
}

fn default_settle_delay() -> Duration {
    Duration::from_secs(10)
}

fn default_log_tail() -> u32 {
    100
}

fn default_environments() -> BTreeMap<EnvironmentId, EnvironmentConfig> {
    EnvironmentId::ALL
        .into_iter()
        .map(|id| (id, EnvironmentConfig::conventional(id)))
        .collect()
}

/// A configuration together with the directory its relative paths resolve against.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub base_dir: PathBuf,
    /// File the configuration came from; `None` for the built-in topology.
    pub source: Option<PathBuf>,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<LoadedConfig> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in candidates {
            if path.exists() {
                return Ok(LoadedConfig {
                    config: Self::load(&path)?,
                    base_dir: dir.to_path_buf(),
                    source: Some(path),
                });
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Discover a config file, falling back to the built-in topology.
    pub fn discover_or_builtin(dir: &Path) -> Result<LoadedConfig> {
        match Self::discover(dir) {
            Err(Error::ConfigNotFound(_)) => {
                tracing::debug!(
                    "no {} in {}, using built-in topology",
                    CONFIG_FILENAME,
                    dir.display()
                );
                Ok(LoadedConfig {
                    config: Self::builtin(),
                    base_dir: dir.to_path_buf(),
                    source: None,
                })
            }
            other => other,
        }
    }

    /// Load an explicit path; relative topology paths resolve next to it.
    pub fn load_explicit(path: &Path) -> Result<LoadedConfig> {
        if !path.is_file() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }

        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(LoadedConfig {
            config: Self::load(path)?,
            base_dir,
            source: Some(path.to_path_buf()),
        })
    }

    /// The static topology used when no configuration file exists.
    pub fn builtin() -> Self {
        let probes = builtin_probes();

        Config {
            project: None,
            default_environment: EnvironmentId::Dev,
            backend: RuntimeConfig::default(),
            settle_delay: default_settle_delay(),
            log_tail: default_log_tail(),
            services: Topology::builtin(),
            environments: default_environments(),
            probes,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.services.validate().map_err(Error::InvalidConfig)?;

        for probe in &self.probes {
            probe.check().map_err(Error::InvalidConfig)?;
            if !self.services.contains(&probe.service) {
                return Err(Error::InvalidConfig(format!(
                    "probe references unknown service: {}",
                    probe.service
                )));
            }
        }

        if let Some(project) = &self.project {
            validate_project_name(project).map_err(Error::InvalidConfig)?;
        }
        for (id, env) in &self.environments {
            if let Some(project) = &env.project {
                validate_project_name(project)
                    .map_err(|e| Error::InvalidConfig(format!("environment '{}': {}", id, e)))?;
            }
        }

        Ok(())
    }

    /// Log level configured for an environment, if the name is known.
    pub fn log_level_for(&self, environment: &str) -> Option<LogLevel> {
        let id: EnvironmentId = environment.parse().ok()?;
        self.environments.get(&id).map(|e| e.log_level)
    }
}

/// Compose project names: lowercase letters, digits, `-` and `_`,
/// starting with a letter or digit.
pub fn validate_project_name(name: &str) -> std::result::Result<(), String> {
    let mut chars = name.chars();
    match chars.next() {
        None => return Err("project name cannot be empty".to_string()),
        Some(c) if !(c.is_ascii_lowercase() || c.is_ascii_digit()) => {
            return Err(format!(
                "invalid project name '{}': must start with a lowercase letter or digit",
                name
            ));
        }
        Some(_) => {}
    }

    let allowed = |c: &char| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '_';
    if let Some(c) = chars.find(|c| !allowed(c)) {
        return Err(format!(
            "invalid project name '{}': unexpected character '{}'",
            name, c
        ));
    }

    Ok(())
}

fn builtin_probes() -> Vec<ProbeConfig> {
    let exec = |service: &str, command: &[&str]| {
        ServiceName::new(service)
            .ok()
            .map(|s| ProbeConfig::exec(s, command))
    };
    let http = |service: &str, url: &str| {
        ServiceName::new(service)
            .ok()
            .map(|s| ProbeConfig::http(s, url))
    };

    [
        exec("postgres", &["pg_isready", "-U", "postgres"]),
        exec("redis", &["redis-cli", "ping"]),
        exec("rabbitmq", &["rabbitmq-diagnostics", "-q", "ping"]),
        http("core-business-service", "http://localhost:8080/health"),
        http("api-gateway", "http://localhost:8000/health"),
    ]
    .into_iter()
    .flatten()
    .collect()
}
