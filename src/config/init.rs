// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Writes a deckhand.yml describing the built-in topology as a starting point.

use std::fmt::Write as _;
use std::path::Path;

use crate::error::{Error, Result};

use super::{CONFIG_FILENAME, Config, validate_project_name};

pub fn init_config(dir: &Path, project: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = Config::builtin();
    if let Some(name) = project {
        validate_project_name(name).map_err(Error::InvalidConfig)?;
        config.project = Some(name.to_string());
    }

    let yaml = generate_template_yaml(&config);
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

fn generate_template_yaml(config: &Config) -> String {
    let mut yaml = String::new();

    if let Some(project) = &config.project {
        let _ = writeln!(yaml, "project: {}", project);
    }
    let _ = writeln!(yaml, "default_environment: {}", config.default_environment);
    let _ = writeln!(
        yaml,
        "settle_delay: {}s",
        config.settle_delay.as_secs()
    );
    let _ = writeln!(yaml, "log_tail: {}", config.log_tail);
    yaml.push_str("# backend:\n#   runtime: docker   # or podman; auto-detected when omitted\n");

    yaml.push_str("\nservices:\n  infrastructure:\n");
    for service in &config.services.infrastructure {
        let _ = writeln!(yaml, "    - {}", service);
    }
    yaml.push_str("  application:\n");
    for service in &config.services.application {
        let _ = writeln!(yaml, "    - {}", service);
    }

    yaml.push_str("\nenvironments:\n");
    for (id, env) in &config.environments {
        let _ = writeln!(yaml, "  {}:", id);
        let _ = writeln!(yaml, "    topology_file: {}", env.topology_file.display());
        if let Some(vars) = &env.variable_file {
            let _ = writeln!(yaml, "    variable_file: {}", vars.display());
        }
        let _ = writeln!(yaml, "    log_level: {}", env.log_level);
        if env.protected {
            yaml.push_str("    protected: true\n");
        }
    }

    yaml.push_str("\nprobes:\n");
    for probe in &config.probes {
        let _ = writeln!(yaml, "  - service: {}", probe.service);
        if let Some(command) = &probe.exec {
            let quoted: Vec<_> = command.iter().map(|c| format!("\"{}\"", c)).collect();
            let _ = writeln!(yaml, "    exec: [{}]", quoted.join(", "));
        }
        if let Some(url) = &probe.http {
            let _ = writeln!(yaml, "    http: {}", url);
        }
    }

    yaml
}
