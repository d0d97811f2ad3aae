// ABOUTME: Per-environment configuration entries.
// ABOUTME: Names the topology and variable files plus defaults for one environment.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

use super::{EnvValue, LogLevel};
use crate::types::EnvironmentId;

#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentConfig {
    /// Compose file describing the service-to-container mapping.
    pub topology_file: PathBuf,

    /// Variable file passed through to the backend.
    #[serde(default)]
    pub variable_file: Option<PathBuf>,

    #[serde(default)]
    pub log_level: LogLevel,

    /// Overrides the project-wide compose project name.
    #[serde(default)]
    pub project: Option<String>,

    /// Protected environments refuse `clean`.
    #[serde(default)]
    pub protected: bool,

    #[serde(default)]
    pub env: HashMap<String, EnvValue>,
}

impl EnvironmentConfig {
    /// Conventional entry: `docker-compose.<id>.yml` and `.env.<id>`.
    pub fn conventional(id: EnvironmentId) -> Self {
        let (log_level, protected) = match id {
            EnvironmentId::Dev => (LogLevel::Debug, false),
            EnvironmentId::Staging => (LogLevel::Info, false),
            EnvironmentId::Prod => (LogLevel::Warn, true),
        };

        EnvironmentConfig {
            topology_file: PathBuf::from(format!("docker-compose.{}.yml", id)),
            variable_file: Some(PathBuf::from(format!(".env.{}", id))),
            log_level,
            project: None,
            protected,
            env: HashMap::new(),
        }
    }
}
