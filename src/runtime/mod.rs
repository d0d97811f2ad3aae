// ABOUTME: Execution backend adapter and container runtime selection.
// ABOUTME: Runs invocations as child processes and picks docker or podman.

mod backend;
mod detection;
mod error;
mod process;
mod types;

pub use backend::{Backend, CaptureMode, ExecOutcome};
pub use detection::{detect_local, resolve_backend};
pub use error::{ExecutionError, ExecutionErrorKind};
pub use process::ProcessBackend;
pub use types::{RuntimeConfig, RuntimeInfo, RuntimeType};
