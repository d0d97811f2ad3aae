// ABOUTME: Ready-to-execute command descriptions and the builder that produces them.
// ABOUTME: Invocations are plain values so command composition is testable without processes.

mod builder;

pub use builder::{BuildError, CommandBuilder, Flags, PruneTarget};

use nonempty::NonEmpty;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// A fully constructed command: tokens plus execution context.
///
/// The token list is never empty and always starts with the backend binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    tokens: NonEmpty<String>,
    working_dir: PathBuf,
    env: BTreeMap<String, String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            tokens: NonEmpty::new(program.into()),
            working_dir: working_dir.into(),
            env: BTreeMap::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.tokens.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for arg in args {
            self.tokens.push(arg.into());
        }
        self
    }

    pub fn envs(mut self, env: &BTreeMap<String, String>) -> Self {
        self.env
            .extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn program(&self) -> &str {
        &self.tokens.head
    }

    /// Arguments after the program name.
    pub fn arguments(&self) -> &[String] {
        &self.tokens.tail
    }

    pub fn tokens(&self) -> Vec<&str> {
        self.tokens.iter().map(String::as_str).collect()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn file_references(&self) -> FileReferences {
        FileReferences::parse(self.tokens.iter())
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if token.is_empty() || token.contains(char::is_whitespace) {
                write!(f, "'{}'", token.replace('\'', "'\\''"))?;
            } else {
                f.write_str(token)?;
            }
        }
        Ok(())
    }
}

/// Topology and variable file references recovered from a token list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileReferences {
    pub topology_file: Option<PathBuf>,
    pub variable_file: Option<PathBuf>,
}

impl FileReferences {
    /// Scan compose-style arguments (`-f X`, `--file X`, `--file=X`,
    /// `--env-file X`, `--env-file=X`). The first occurrence wins.
    pub fn parse<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut refs = FileReferences::default();
        let mut pending: Option<bool> = None;

        for token in tokens {
            let token = token.as_ref();

            if let Some(is_topology) = pending.take() {
                refs.set(is_topology, token);
                continue;
            }

            match token {
                "-f" | "--file" => pending = Some(true),
                "--env-file" => pending = Some(false),
                _ => {
                    if let Some(value) = token.strip_prefix("--file=") {
                        refs.set(true, value);
                    } else if let Some(value) = token.strip_prefix("--env-file=") {
                        refs.set(false, value);
                    }
                }
            }
        }

        refs
    }

    fn set(&mut self, is_topology: bool, value: &str) {
        let slot = if is_topology {
            &mut self.topology_file
        } else {
            &mut self.variable_file
        };
        if slot.is_none() {
            *slot = Some(PathBuf::from(value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_is_first_token() {
        let inv = Invocation::new("docker", "/srv").args(["compose", "ps"]);
        assert_eq!(inv.program(), "docker");
        assert_eq!(inv.arguments(), ["compose", "ps"]);
        assert_eq!(inv.tokens(), vec!["docker", "compose", "ps"]);
    }

    #[test]
    fn display_quotes_whitespace() {
        let inv = Invocation::new("docker", ".").arg("my file.yml");
        assert_eq!(inv.to_string(), "docker 'my file.yml'");
    }

    #[test]
    fn parses_separate_and_inline_forms() {
        let refs = FileReferences::parse(["docker", "compose", "--file=a.yml", "--env-file", ".env"]);
        assert_eq!(refs.topology_file, Some(PathBuf::from("a.yml")));
        assert_eq!(refs.variable_file, Some(PathBuf::from(".env")));
    }

    #[test]
    fn missing_references_stay_empty() {
        let refs = FileReferences::parse(["docker", "image", "prune"]);
        assert_eq!(refs, FileReferences::default());
    }

    #[test]
    fn dangling_flag_is_ignored() {
        let refs = FileReferences::parse(["docker", "compose", "-f"]);
        assert!(refs.topology_file.is_none());
    }
}
