// ABOUTME: Health probe declarations for critical services.
// ABOUTME: A probe is either a command run inside the service container or an HTTP GET.

use serde::Deserialize;
use std::time::Duration;

use crate::types::ServiceName;

#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    pub service: ServiceName,

    #[serde(default)]
    pub exec: Option<Vec<String>>,

    #[serde(default)]
    pub http: Option<String>,

    /// Expected HTTP status; any 2xx passes when unset.
    #[serde(default)]
    pub expect_status: Option<u16>,

    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

/// The observable predicate a probe evaluates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeCheck {
    Exec {
        command: Vec<String>,
    },
    Http {
        url: String,
        expect_status: Option<u16>,
    },
}

fn default_timeout() -> Duration {
    Duration::from_secs(5)
}

impl ProbeConfig {
    pub fn exec(service: ServiceName, command: &[&str]) -> Self {
        ProbeConfig {
            service,
            exec: Some(command.iter().map(|s| s.to_string()).collect()),
            http: None,
            expect_status: None,
            timeout: default_timeout(),
        }
    }

    pub fn http(service: ServiceName, url: &str) -> Self {
        ProbeConfig {
            service,
            exec: None,
            http: Some(url.to_string()),
            expect_status: None,
            timeout: default_timeout(),
        }
    }

    /// Exactly one of `exec` or `http` must be set.
    pub fn check(&self) -> Result<ProbeCheck, String> {
        match (&self.exec, &self.http) {
            (Some(command), None) if command.is_empty() => Err(format!(
                "probe for {}: exec command cannot be empty",
                self.service
            )),
            (Some(command), None) => Ok(ProbeCheck::Exec {
                command: command.clone(),
            }),
            (None, Some(url)) => Ok(ProbeCheck::Http {
                url: url.clone(),
                expect_status: self.expect_status,
            }),
            (Some(_), Some(_)) => Err(format!(
                "probe for {}: set either exec or http, not both",
                self.service
            )),
            (None, None) => Err(format!(
                "probe for {}: one of exec or http is required",
                self.service
            )),
        }
    }
}
