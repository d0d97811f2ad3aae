// ABOUTME: Compose service name validation.
// ABOUTME: Names use the compose key character set and never look like command-line options.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceNameError {
    #[error("service name cannot be empty")]
    Empty,

    #[error("service name must start with a letter or digit, found '{0}'")]
    InvalidStart(char),

    #[error("invalid character in service name: '{0}'")]
    InvalidChar(char),
}

/// A compose service key: ASCII letters, digits, `.`, `_` and `-`.
///
/// The first character must be a letter or digit so a name passed as a
/// trailing argument is never parsed as a flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceName(String);

impl ServiceName {
    pub fn new(value: &str) -> Result<Self, ServiceNameError> {
        let first = value.chars().next().ok_or(ServiceNameError::Empty)?;
        if !first.is_ascii_alphanumeric() {
            return Err(ServiceNameError::InvalidStart(first));
        }

        if let Some(c) = value
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
        {
            return Err(ServiceNameError::InvalidChar(c));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ServiceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ServiceName {
    type Err = ServiceNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for ServiceName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ServiceName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ServiceName::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_compose_style_names() {
        assert!(ServiceName::new("core-business-service").is_ok());
        assert!(ServiceName::new("postgres").is_ok());
        assert!(ServiceName::new("worker_2").is_ok());
        assert!(ServiceName::new("api.v2").is_ok());
        assert!(ServiceName::new("Web").is_ok());
        assert!(ServiceName::new("api-").is_ok());
    }

    #[test]
    fn rejects_invalid_names() {
        assert_eq!(ServiceName::new(""), Err(ServiceNameError::Empty));
        assert_eq!(
            ServiceName::new("-api"),
            Err(ServiceNameError::InvalidStart('-'))
        );
        assert_eq!(
            ServiceName::new(".hidden"),
            Err(ServiceNameError::InvalidStart('.'))
        );
        assert_eq!(
            ServiceName::new("api gw"),
            Err(ServiceNameError::InvalidChar(' '))
        );
        assert_eq!(
            ServiceName::new("api/gw"),
            Err(ServiceNameError::InvalidChar('/'))
        );
    }
}
