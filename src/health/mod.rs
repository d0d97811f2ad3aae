// ABOUTME: Health verification for critical services after a dispatch.
// ABOUTME: Probes classify each service as healthy, unhealthy, or unknown.

mod http;
mod verifier;

pub use http::HttpProbeError;
pub use verifier::HealthVerifier;

use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::config::{ProbeCheck, ProbeConfig};
use crate::types::ServiceName;

/// A runnable check for one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthProbe {
    pub service: ServiceName,
    pub check: ProbeCheck,
    pub timeout: Duration,
}

impl TryFrom<&ProbeConfig> for HealthProbe {
    type Error = String;

    fn try_from(config: &ProbeConfig) -> Result<Self, Self::Error> {
        Ok(HealthProbe {
            service: config.service.clone(),
            check: config.check()?,
            timeout: config.timeout,
        })
    }
}

/// Classification of a probe result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// The probe ran and passed.
    Healthy,
    /// The probe ran and reported failure.
    Unhealthy,
    /// The probe itself could not be executed.
    Unknown,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Unhealthy => "unhealthy",
            HealthStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    pub service: ServiceName,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ProbeOutcome {
    pub fn new(service: ServiceName, status: HealthStatus, detail: Option<String>) -> Self {
        Self {
            service,
            status,
            detail,
        }
    }
}

/// Health section of a deployment report. Advisory only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub probes: Vec<ProbeOutcome>,
}

impl HealthReport {
    pub fn count(&self, status: HealthStatus) -> usize {
        self.probes.iter().filter(|p| p.status == status).count()
    }

    pub fn all_healthy(&self) -> bool {
        self.probes.iter().all(|p| p.status == HealthStatus::Healthy)
    }

    pub fn get(&self, service: &ServiceName) -> Option<&ProbeOutcome> {
        self.probes.iter().find(|p| &p.service == service)
    }
}
