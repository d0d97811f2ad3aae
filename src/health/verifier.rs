// ABOUTME: Runs health probes concurrently and aggregates a health report.
// ABOUTME: Never fails: probes that cannot run are classified as unknown.

use futures::future::join_all;
use std::time::Duration;

use super::http::get_status;
use super::{HealthProbe, HealthReport, HealthStatus, ProbeOutcome};
use crate::config::ProbeCheck;
use crate::environment::Environment;
use crate::invocation::CommandBuilder;
use crate::runtime::{Backend, CaptureMode};
use crate::types::ServiceName;

pub struct HealthVerifier<'a, B: Backend> {
    backend: &'a B,
    builder: &'a CommandBuilder,
}

impl<'a, B: Backend> HealthVerifier<'a, B> {
    pub fn new(backend: &'a B, builder: &'a CommandBuilder) -> Self {
        Self { backend, builder }
    }

    /// Run every probe and wait for all of them.
    ///
    /// The report has one entry per probe, in declaration order.
    pub async fn verify(&self, env: &Environment, probes: &[HealthProbe]) -> HealthReport {
        tracing::info!("running {} health probe(s)", probes.len());

        let outcomes = join_all(probes.iter().map(|probe| self.run_probe(env, probe))).await;

        for outcome in &outcomes {
            match outcome.status {
                HealthStatus::Healthy => tracing::debug!("{}: healthy", outcome.service),
                status => tracing::warn!(
                    "{}: {}{}",
                    outcome.service,
                    status,
                    outcome
                        .detail
                        .as_deref()
                        .map(|d| format!(" ({})", d))
                        .unwrap_or_default()
                ),
            }
        }

        HealthReport { probes: outcomes }
    }

    async fn run_probe(&self, env: &Environment, probe: &HealthProbe) -> ProbeOutcome {
        let (status, detail) = match &probe.check {
            ProbeCheck::Exec { command } => {
                self.exec_probe(env, &probe.service, command, probe.timeout)
                    .await
            }
            ProbeCheck::Http { url, expect_status } => {
                http_probe(url, *expect_status, probe.timeout).await
            }
        };
        ProbeOutcome::new(probe.service.clone(), status, detail)
    }

    async fn exec_probe(
        &self,
        env: &Environment,
        service: &ServiceName,
        command: &[String],
        timeout: Duration,
    ) -> (HealthStatus, Option<String>) {
        let invocation = match self.builder.build_exec(env, service, command) {
            Ok(inv) => inv,
            Err(e) => return (HealthStatus::Unknown, Some(e.to_string())),
        };

        let run = self.backend.run(&invocation, CaptureMode::Buffer);
        match tokio::time::timeout(timeout, run).await {
            Ok(Ok(outcome)) if outcome.success() => (HealthStatus::Healthy, None),
            Ok(Ok(outcome)) => {
                let reason = outcome
                    .stderr
                    .lines()
                    .chain(outcome.stdout.lines())
                    .map(str::trim)
                    .find(|l| !l.is_empty())
                    .map(|l| format!("exit {}: {}", outcome.exit_code, l))
                    .unwrap_or_else(|| format!("exit {}", outcome.exit_code));
                (HealthStatus::Unhealthy, Some(reason))
            }
            Ok(Err(e)) => (HealthStatus::Unknown, Some(e.to_string())),
            Err(_) => (HealthStatus::Unhealthy, Some(timed_out(timeout))),
        }
    }
}

async fn http_probe(
    url: &str,
    expect_status: Option<u16>,
    timeout: Duration,
) -> (HealthStatus, Option<String>) {
    match tokio::time::timeout(timeout, get_status(url)).await {
        Ok(Ok(status)) => {
            let passed = match expect_status {
                Some(expected) => status.as_u16() == expected,
                None => status.is_success(),
            };
            if passed {
                (HealthStatus::Healthy, None)
            } else {
                (HealthStatus::Unhealthy, Some(format!("HTTP {}", status)))
            }
        }
        Ok(Err(e)) => (HealthStatus::Unknown, Some(e.to_string())),
        Err(_) => (HealthStatus::Unknown, Some(timed_out(timeout))),
    }
}

fn timed_out(timeout: Duration) -> String {
    format!("timed out after {:?}", timeout)
}
