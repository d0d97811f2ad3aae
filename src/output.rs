// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use serde::Serialize;
use std::time::Instant;

use crate::deploy::{DeploymentReport, OverallStatus, PhaseOutcome};
use crate::health::HealthStatus;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON documents for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration_secs(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => {
                println!("{message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "success",
                    message,
                    duration_secs: self.duration_secs(),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{json}");
                }
            }
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "error",
                    message,
                    duration_secs: self.duration_secs(),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }

    /// Render a deployment report.
    pub fn report(&self, report: &DeploymentReport) {
        match self.mode {
            OutputMode::Normal => print!("{}", render_summary(report)),
            OutputMode::Quiet => println!("{}", render_status_line(report)),
            OutputMode::Json => {
                let doc = JsonReport {
                    status: report.overall_status(),
                    report,
                };
                if let Ok(json) = serde_json::to_string_pretty(&doc) {
                    println!("{json}");
                }
            }
        }
    }
}

/// One line: environment, operation, and overall status.
pub fn render_status_line(report: &DeploymentReport) -> String {
    let mut line = format!(
        "{} {}: {}",
        report.environment,
        report.operation,
        report.overall_status()
    );
    if report.cancelled {
        line.push_str(" (cancelled)");
    }
    line
}

/// Multi-line human summary of phases, health, and warnings.
pub fn render_summary(report: &DeploymentReport) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} (project {})",
        report.environment, report.operation, report.project
    );

    for record in &report.phases {
        let mark = match record.outcome {
            o if o.succeeded() => "✓",
            PhaseOutcome::Skipped { .. } => "-",
            _ => "✗",
        };
        let _ = writeln!(
            out,
            "  {} {:<22} {:<24} {:>6.1}s",
            mark,
            record.phase.as_str(),
            record.outcome.to_string(),
            record.duration.as_secs_f64()
        );
        if let Some(output) = &record.output
            && !record.outcome.succeeded()
        {
            for line in output.lines() {
                let _ = writeln!(out, "      {}", line);
            }
        }
    }

    if let Some(health) = &report.health {
        let _ = writeln!(out, "health:");
        for probe in &health.probes {
            let mark = match probe.status {
                HealthStatus::Healthy => "✓",
                HealthStatus::Unhealthy => "✗",
                HealthStatus::Unknown => "?",
            };
            let _ = write!(out, "  {} {:<24} {}", mark, probe.service, probe.status);
            if let Some(detail) = &probe.detail {
                let _ = write!(out, " ({})", detail);
            }
            let _ = writeln!(out);
        }
    }

    for warning in &report.warnings {
        let _ = writeln!(out, "warning: {}", warning);
    }

    let _ = writeln!(out, "{}", status_label(report));
    out
}

fn status_label(report: &DeploymentReport) -> String {
    let elapsed = (report.finished_at - report.started_at)
        .to_std()
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    match report.overall_status() {
        OverallStatus::Success => format!("✓ {} ({:.1}s)", OverallStatus::Success, elapsed),
        status => format!("✗ {}{} ({:.1}s)", status, cancelled_suffix(report), elapsed),
    }
}

fn cancelled_suffix(report: &DeploymentReport) -> &'static str {
    if report.cancelled { ", cancelled" } else { "" }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    status: OverallStatus,
    #[serde(flatten)]
    report: &'a DeploymentReport,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::{Phase, PhaseLog, PhaseRecord, ReportBuilder, SkipReason};
    use crate::health::{HealthReport, ProbeOutcome};
    use crate::invocation::Flags;
    use crate::types::{EnvironmentId, Operation, ServiceName};
    use std::time::Duration;

    fn sample() -> DeploymentReport {
        let log = PhaseLog {
            phases: vec![
                PhaseRecord {
                    phase: Phase::StartInfrastructure,
                    command: Some("docker compose up --detach postgres".to_string()),
                    outcome: PhaseOutcome::Exited { code: 0 },
                    duration: Duration::from_millis(1200),
                    output: None,
                },
                PhaseRecord {
                    phase: Phase::StartApplications,
                    command: Some("docker compose up --detach api-gateway".to_string()),
                    outcome: PhaseOutcome::Exited { code: 1 },
                    duration: Duration::from_millis(300),
                    output: Some("port already allocated".to_string()),
                },
                PhaseRecord::skipped(Phase::PruneImages, SkipReason::DependencyFailed),
            ],
            cancelled: false,
        };
        let health = HealthReport {
            probes: vec![ProbeOutcome::new(
                ServiceName::new("postgres").unwrap(),
                HealthStatus::Healthy,
                None,
            )],
        };
        ReportBuilder::new(
            EnvironmentId::Dev,
            "app",
            Operation::Up,
            &[],
            Flags::default(),
        )
        .finish(log, Some(health), vec!["variable file missing".to_string()])
    }

    #[test]
    fn summary_lists_phases_health_and_warnings() {
        let text = render_summary(&sample());
        assert!(text.starts_with("dev up (project app)"));
        assert!(text.contains("✓ start-infrastructure"));
        assert!(text.contains("✗ start-applications"));
        assert!(text.contains("port already allocated"));
        assert!(text.contains("- prune-images"));
        assert!(text.contains("postgres"));
        assert!(text.contains("warning: variable file missing"));
        assert!(text.contains("partial failure"));
    }

    #[test]
    fn status_line_is_single_line() {
        assert_eq!(render_status_line(&sample()), "dev up: partial failure");
    }

    #[test]
    fn json_report_includes_status() {
        let report = sample();
        let doc = JsonReport {
            status: report.overall_status(),
            report: &report,
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["status"], "partial-failure");
        assert_eq!(json["environment"], "dev");
        assert_eq!(json["phases"].as_array().unwrap().len(), 3);
        assert_eq!(json["health"]["probes"][0]["status"], "healthy");
    }
}
