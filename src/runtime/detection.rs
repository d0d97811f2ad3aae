// ABOUTME: Runtime selection for the local system.
// ABOUTME: Explicit config wins; otherwise checks Podman sockets first, then Docker.

use super::types::{RuntimeConfig, RuntimeInfo, RuntimeType};
use std::path::Path;

const ROOTFUL_PODMAN: &str = "/run/podman/podman.sock";
const DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// Detect container runtime on the local system.
///
/// Detection order:
/// 1. Rootless Podman socket (`/run/user/$UID/podman/podman.sock`)
/// 2. Rootful Podman socket (`/run/podman/podman.sock`)
/// 3. Docker socket (`/var/run/docker.sock`)
pub fn detect_local() -> Option<RuntimeType> {
    if let Some(uid) = get_uid() {
        let rootless_socket = format!("/run/user/{}/podman/podman.sock", uid);
        if Path::new(&rootless_socket).exists() {
            return Some(RuntimeType::Podman);
        }
    }

    if Path::new(ROOTFUL_PODMAN).exists() {
        return Some(RuntimeType::Podman);
    }

    if Path::new(DOCKER_SOCKET).exists() {
        return Some(RuntimeType::Docker);
    }

    None
}

fn get_uid() -> Option<String> {
    std::env::var("UID").ok().or_else(|| {
        std::fs::read_to_string("/proc/self/status")
            .ok()
            .and_then(|s| {
                s.lines()
                    .find(|l| l.starts_with("Uid:"))
                    .and_then(|l| l.split_whitespace().nth(1))
                    .map(|s| s.to_string())
            })
    })
}

/// Pick the backend binary for this run.
///
/// An explicit runtime skips detection. With nothing configured and no
/// socket found, Docker is assumed so a missing binary surfaces as a
/// launch failure on the first invocation.
pub fn resolve_backend(config: &RuntimeConfig) -> RuntimeInfo {
    let runtime_type = match config.runtime {
        Some(runtime) => runtime,
        None => detect_local().unwrap_or_else(|| {
            tracing::debug!("no container runtime socket found, assuming docker");
            RuntimeType::Docker
        }),
    };

    let binary = config
        .binary
        .clone()
        .unwrap_or_else(|| runtime_type.default_binary().to_string());

    RuntimeInfo {
        runtime_type,
        binary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_runtime_uses_its_default_binary() {
        let info = resolve_backend(&RuntimeConfig {
            runtime: Some(RuntimeType::Podman),
            binary: None,
        });
        assert_eq!(info.runtime_type, RuntimeType::Podman);
        assert_eq!(info.binary, "podman");
    }

    #[test]
    fn explicit_binary_overrides_default() {
        let info = resolve_backend(&RuntimeConfig {
            runtime: Some(RuntimeType::Docker),
            binary: Some("/opt/bin/docker".to_string()),
        });
        assert_eq!(info.binary, "/opt/bin/docker");
    }
}
