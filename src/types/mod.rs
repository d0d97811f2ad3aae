// ABOUTME: Validated domain types shared across the crate.
// ABOUTME: Service names, environment identifiers, and lifecycle operations.

mod environment_id;
mod operation;
mod service_name;

pub use environment_id::{EnvironmentId, InvalidEnvironment};
pub use operation::Operation;
pub use service_name::{ServiceName, ServiceNameError};
