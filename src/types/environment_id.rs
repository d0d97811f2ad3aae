// ABOUTME: Closed set of deployment environments.
// ABOUTME: Parsing an unknown identifier is the only way to get InvalidEnvironment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid environment '{0}' (expected one of: dev, staging, prod)")]
pub struct InvalidEnvironment(pub String);

/// A named deployment environment.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentId {
    #[default]
    Dev,
    Staging,
    Prod,
}

impl EnvironmentId {
    pub const ALL: [EnvironmentId; 3] = [
        EnvironmentId::Dev,
        EnvironmentId::Staging,
        EnvironmentId::Prod,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentId::Dev => "dev",
            EnvironmentId::Staging => "staging",
            EnvironmentId::Prod => "prod",
        }
    }
}

impl FromStr for EnvironmentId {
    type Err = InvalidEnvironment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(EnvironmentId::Dev),
            "staging" | "stage" => Ok(EnvironmentId::Staging),
            "prod" | "production" => Ok(EnvironmentId::Prod),
            _ => Err(InvalidEnvironment(s.to_string())),
        }
    }
}

impl fmt::Display for EnvironmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
