// ABOUTME: Static service topology split into infrastructure and application sets.
// ABOUTME: Membership decides startup order; it is configuration, never derived at runtime.

use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

use crate::types::ServiceName;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown service: {0}")]
pub struct UnknownService(pub String);

/// Which set a service belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceRole {
    /// Must be ready before application services start.
    Infrastructure,
    /// Business logic units.
    Application,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub infrastructure: Vec<ServiceName>,

    #[serde(default)]
    pub application: Vec<ServiceName>,
}

impl Topology {
    pub fn builtin() -> Self {
        let names = |list: &[&str]| {
            list.iter()
                .filter_map(|s| ServiceName::new(s).ok())
                .collect::<Vec<_>>()
        };

        Topology {
            infrastructure: names(&["postgres", "redis", "rabbitmq"]),
            application: names(&[
                "core-business-service",
                "api-gateway",
                "notification-service",
            ]),
        }
    }

    pub fn role_of(&self, service: &ServiceName) -> Option<ServiceRole> {
        if self.infrastructure.contains(service) {
            Some(ServiceRole::Infrastructure)
        } else if self.application.contains(service) {
            Some(ServiceRole::Application)
        } else {
            None
        }
    }

    pub fn contains(&self, service: &ServiceName) -> bool {
        self.role_of(service).is_some()
    }

    /// Infrastructure first, then application services.
    pub fn all(&self) -> impl Iterator<Item = &ServiceName> {
        self.infrastructure.iter().chain(self.application.iter())
    }

    /// Fail on the first name that is not part of the topology.
    pub fn check_services(&self, services: &[ServiceName]) -> Result<(), UnknownService> {
        match services.iter().find(|s| !self.contains(s)) {
            Some(unknown) => Err(UnknownService(unknown.to_string())),
            None => Ok(()),
        }
    }

    /// Application services targeted by a subset; an empty subset means all of them.
    pub fn application_targets(&self, subset: &[ServiceName]) -> Vec<ServiceName> {
        if subset.is_empty() {
            return self.application.clone();
        }
        subset
            .iter()
            .filter(|s| self.role_of(s) == Some(ServiceRole::Application))
            .cloned()
            .collect()
    }

    /// Sets must be disjoint, free of duplicates, and not both empty.
    pub fn validate(&self) -> Result<(), String> {
        if self.infrastructure.is_empty() && self.application.is_empty() {
            return Err("topology must declare at least one service".to_string());
        }

        let mut seen = HashSet::new();
        for service in self.all() {
            if !seen.insert(service) {
                return Err(format!(
                    "service {} is declared more than once in the topology",
                    service
                ));
            }
        }

        Ok(())
    }
}
