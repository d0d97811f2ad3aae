// ABOUTME: Runtime type definitions for Docker and Podman.
// ABOUTME: Includes RuntimeType enum, the resolved RuntimeInfo, and config overrides.

use serde::{Deserialize, Serialize};

/// The container runtime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeType {
    Docker,
    Podman,
}

impl RuntimeType {
    /// Default CLI binary for this runtime.
    pub fn default_binary(&self) -> &'static str {
        match self {
            RuntimeType::Docker => "docker",
            RuntimeType::Podman => "podman",
        }
    }
}

impl std::fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeType::Docker => write!(f, "docker"),
            RuntimeType::Podman => write!(f, "podman"),
        }
    }
}

/// Resolved backend selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeInfo {
    /// The type of runtime selected.
    pub runtime_type: RuntimeType,
    /// Binary every invocation starts with.
    pub binary: String,
}

/// Configuration for explicit runtime override.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeConfig {
    /// Explicit runtime type (overrides auto-detection).
    pub runtime: Option<RuntimeType>,
    /// Explicit binary path (overrides the runtime's default binary).
    pub binary: Option<String>,
}
