// ABOUTME: Environment resolver mapping an environment name to a typed bundle.
// ABOUTME: Checks the referenced files exist; a missing variable file is only a warning.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{Config, LogLevel, MissingEnvVar, resolve_env_map};
use crate::diagnostics::{Diagnostics, Warning};
use crate::types::{EnvironmentId, InvalidEnvironment};

/// Fallback compose project name when neither config nor directory provide one.
const DEFAULT_PROJECT: &str = "deckhand";

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    InvalidEnvironment(#[from] InvalidEnvironment),

    #[error("environment '{0}' has no configuration entry")]
    NotConfigured(EnvironmentId),

    #[error("configuration not found for environment '{environment}': {}", .path.display())]
    ConfigurationNotFound {
        environment: EnvironmentId,
        path: PathBuf,
    },

    #[error("path for environment '{environment}' is not valid UTF-8: {}", .path.display())]
    NonUtf8Path {
        environment: EnvironmentId,
        path: PathBuf,
    },

    #[error("environment '{environment}': {source}")]
    MissingVariable {
        environment: EnvironmentId,
        source: MissingEnvVar,
    },
}

/// A resolved environment. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub id: EnvironmentId,
    pub topology_file: PathBuf,
    /// `None` when no variable file is configured or it does not exist;
    /// the backend then falls back to its own defaults.
    pub variable_file: Option<PathBuf>,
    pub log_level: LogLevel,
    pub project: String,
    pub working_dir: PathBuf,
    pub protected: bool,
    /// Extra variables exported to every backend invocation.
    pub variables: BTreeMap<String, String>,
}

/// Resolves environment names against a configuration.
pub struct EnvironmentResolver<'a> {
    config: &'a Config,
    base_dir: &'a Path,
}

impl<'a> EnvironmentResolver<'a> {
    pub fn new(config: &'a Config, base_dir: &'a Path) -> Self {
        Self { config, base_dir }
    }

    /// Resolve `name` into an [`Environment`].
    ///
    /// Relative file references are joined onto the base directory so the
    /// resulting invocations do not depend on the caller's working directory.
    pub fn resolve(&self, name: &str, diag: &mut Diagnostics) -> Result<Environment, ResolveError> {
        let id: EnvironmentId = name.parse()?;
        self.resolve_id(id, diag)
    }

    pub fn resolve_id(
        &self,
        id: EnvironmentId,
        diag: &mut Diagnostics,
    ) -> Result<Environment, ResolveError> {
        let entry = self
            .config
            .environments
            .get(&id)
            .ok_or(ResolveError::NotConfigured(id))?;

        // Invocation tokens are strings; a lossy conversion would name a different file.
        let utf8 = |path: PathBuf| match path.to_str() {
            Some(_) => Ok(path),
            None => Err(ResolveError::NonUtf8Path {
                environment: id,
                path,
            }),
        };

        let topology_file = utf8(self.base_dir.join(&entry.topology_file))?;
        if !topology_file.is_file() {
            return Err(ResolveError::ConfigurationNotFound {
                environment: id,
                path: topology_file,
            });
        }

        let variable_file = match &entry.variable_file {
            Some(path) => {
                let path = utf8(self.base_dir.join(path))?;
                if path.is_file() {
                    Some(path)
                } else {
                    diag.warn(Warning::missing_variable_file(format!(
                        "variable file {} for '{}' not found, using backend defaults",
                        path.display(),
                        id
                    )));
                    None
                }
            }
            None => None,
        };

        let variables =
            resolve_env_map(&entry.env).map_err(|source| ResolveError::MissingVariable {
                environment: id,
                source,
            })?;

        let project = entry
            .project
            .clone()
            .or_else(|| self.config.project.clone())
            .unwrap_or_else(|| project_from_dir(self.base_dir));

        tracing::debug!(
            environment = %id,
            topology = %topology_file.display(),
            project = %project,
            "resolved environment"
        );

        Ok(Environment {
            id,
            topology_file,
            variable_file,
            log_level: entry.log_level,
            project,
            working_dir: self.base_dir.to_path_buf(),
            protected: entry.protected,
            variables,
        })
    }
}

/// Compose-compatible project name derived from a directory name.
fn project_from_dir(dir: &Path) -> String {
    let absolute = std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf());
    let name: String = absolute
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .skip_while(|c| *c == '-' || *c == '_')
        .collect();

    if name.is_empty() {
        DEFAULT_PROJECT.to_string()
    } else {
        name
    }
}
