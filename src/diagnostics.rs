// ABOUTME: Diagnostics accumulator for non-fatal warnings during a dispatch.
// ABOUTME: Warnings are logged as they occur and copied into the deployment report.

/// Collects non-fatal warnings during a dispatch.
#[derive(Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Consume the accumulator, keeping only the messages.
    pub fn into_messages(self) -> Vec<String> {
        self.warnings.into_iter().map(|w| w.message).collect()
    }
}

/// A non-fatal warning collected during a dispatch.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// The environment's variable file is missing.
    pub fn missing_variable_file(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::MissingVariableFile,
            message: message.into(),
        }
    }

    /// A phase had nothing to act on and was skipped.
    pub fn no_targets(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::NoTargets,
            message: message.into(),
        }
    }

    /// A configured probe could not be turned into a runnable check.
    pub fn probe_skipped(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ProbeSkipped,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Variable file referenced by the environment does not exist.
    MissingVariableFile,
    /// A phase was skipped because its target set was empty.
    NoTargets,
    /// A health probe definition was unusable.
    ProbeSkipped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_starts_empty() {
        let diag = Diagnostics::default();
        assert!(!diag.has_warnings());
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn diagnostics_collects_warnings_in_order() {
        let mut diag = Diagnostics::default();

        diag.warn(Warning::missing_variable_file(".env.dev not found"));
        diag.warn(Warning::no_targets("no application services selected"));

        assert!(diag.has_warnings());
        assert_eq!(diag.warnings()[0].kind, WarningKind::MissingVariableFile);
        assert_eq!(
            diag.into_messages(),
            vec![
                ".env.dev not found".to_string(),
                "no application services selected".to_string()
            ]
        );
    }
}
