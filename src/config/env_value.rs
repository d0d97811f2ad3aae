// ABOUTME: Environment variable value types with interpolation support.
// ABOUTME: Values are either literals or references to the operator's shell environment.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required environment variable: {0}")]
pub struct MissingEnvVar(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Literal(String),
    FromEnv {
        #[serde(rename = "env")]
        var: String,
        #[serde(default)]
        default: Option<String>,
    },
}

impl EnvValue {
    pub fn resolve(&self) -> Result<String, MissingEnvVar> {
        match self {
            EnvValue::Literal(s) => Ok(s.clone()),
            EnvValue::FromEnv { var, default } => match std::env::var(var) {
                Ok(val) => Ok(val),
                Err(_) => default.clone().ok_or_else(|| MissingEnvVar(var.clone())),
            },
        }
    }
}

/// Resolve every entry, failing on the first missing reference.
///
/// The result is ordered so invocations built from it are reproducible.
pub fn resolve_env_map(
    map: &HashMap<String, EnvValue>,
) -> Result<BTreeMap<String, String>, MissingEnvVar> {
    map.iter()
        .map(|(k, v)| v.resolve().map(|resolved| (k.clone(), resolved)))
        .collect()
}
