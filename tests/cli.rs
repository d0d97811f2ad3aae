// ABOUTME: Integration tests for the deckhand CLI commands.
// ABOUTME: Validates help output, init, and exit codes for each failure class.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn deckhand_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("deckhand"))
}

/// A project whose backend binary is `binary`, with compose files for dev and prod.
fn project(binary: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("deckhand.yml"),
        format!("project: clitest\nbackend:\n  runtime: docker\n  binary: {binary}\nsettle_delay: 0s\n"),
    )
    .unwrap();
    fs::write(dir.path().join("docker-compose.dev.yml"), "services: {}\n").unwrap();
    fs::write(dir.path().join("docker-compose.prod.yml"), "services: {}\n").unwrap();
    dir
}

#[test]
fn help_shows_commands() {
    deckhand_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("up"))
        .stdout(predicate::str::contains("down"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("clean"));
}

#[test]
fn init_creates_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("deckhand.yml");

    deckhand_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "--project", "shop"])
        .assert()
        .success();

    assert!(config_path.exists(), "deckhand.yml should be created");
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("project: shop"));
    assert!(content.contains("infrastructure:"));
}

#[test]
fn init_refuses_to_overwrite_existing_config() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("deckhand.yml"), "project: keep\n").unwrap();

    deckhand_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn init_rejects_malformed_project_name() {
    let temp_dir = TempDir::new().unwrap();

    deckhand_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "--project", "shop: v2"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("invalid project name"));

    assert!(!temp_dir.path().join("deckhand.yml").exists());
}

#[test]
fn unknown_subcommand_is_usage_error() {
    deckhand_cmd().arg("frobnicate").assert().code(2);
}

#[test]
fn invalid_environment_exits_with_environment_code() {
    let dir = project("true");
    deckhand_cmd()
        .current_dir(dir.path())
        .args(["status", "--env", "qa"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("invalid environment 'qa'"));
}

#[test]
fn missing_topology_file_exits_with_environment_code() {
    let dir = project("true");
    deckhand_cmd()
        .current_dir(dir.path())
        .args(["down", "--env", "staging"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("configuration not found"));
}

#[test]
fn unknown_service_exits_with_environment_code() {
    let dir = project("true");
    deckhand_cmd()
        .current_dir(dir.path())
        .args(["restart", "--services", "redis,ghost"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn unreadable_config_exits_with_environment_code() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("deckhand.yml")).unwrap();

    deckhand_cmd()
        .current_dir(dir.path())
        .args(["status", "--env", "dev"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("cannot read configuration"));
}

#[test]
fn clean_on_protected_environment_is_refused() {
    let dir = project("true");
    deckhand_cmd()
        .current_dir(dir.path())
        .args(["clean", "--env", "prod", "--force"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("protected"));
}

#[test]
fn successful_down_exits_zero() {
    let dir = project("true");
    deckhand_cmd()
        .current_dir(dir.path())
        .args(["--quiet", "down"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dev down: success"));
}

#[test]
fn failing_phase_exits_with_operation_code() {
    let dir = project("false");
    deckhand_cmd()
        .current_dir(dir.path())
        .args(["down", "--env", "prod", "--services", "api-gateway"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("down finished with failure"));
}

#[test]
fn unlaunchable_backend_exits_with_execution_code() {
    let dir = project("deckhand-missing-backend-binary");
    deckhand_cmd()
        .current_dir(dir.path())
        .args(["--json", "down"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("\"event\":\"error\""))
        .stderr(predicate::str::contains("deckhand-missing-backend-binary"));
}

#[test]
fn json_mode_prints_report() {
    let dir = project("true");
    let output = deckhand_cmd()
        .current_dir(dir.path())
        .args(["--json", "down", "--force"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["status"], "success");
    assert_eq!(report["operation"], "down");
    assert_eq!(report["environment"], "dev");
    assert_eq!(report["project"], "clitest");
    assert_eq!(report["flags"]["force"], true);
    let command = report["phases"][0]["command"].as_str().unwrap();
    assert!(command.starts_with("true compose -f "));
    assert!(command.contains("--volumes"));
}

#[test]
fn explicit_config_path_is_honoured() {
    let dir = project("true");
    let elsewhere = TempDir::new().unwrap();
    deckhand_cmd()
        .current_dir(elsewhere.path())
        .arg("--config")
        .arg(dir.path().join("deckhand.yml"))
        .args(["--quiet", "down"])
        .assert()
        .success();
}
