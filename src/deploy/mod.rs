// ABOUTME: Topology orchestration: phase plans, cancellation, and deployment reports.
// ABOUTME: Exports the Orchestrator and the report types shared with the dispatcher.

mod cancel;
mod error;
mod orchestrator;
mod phase;
mod report;

pub use cancel::{CancelHandle, CancelSignal};
pub use error::OrchestrationError;
pub use orchestrator::{OrchestrationResult, Orchestrator, PhaseLog};
pub use phase::{Phase, PhaseOutcome, PhaseRecord, SkipReason};
pub use report::{DeploymentReport, OverallStatus, ReportBuilder};
