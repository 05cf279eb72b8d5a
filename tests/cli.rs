// ABOUTME: Integration tests for the tunnelfleet CLI commands.
// ABOUTME: Covers help output, argument validation and failures before any runtime call.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn tunnelfleet_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tunnelfleet"));
    cmd.env_remove("RUST_LOG");
    cmd
}

const NEEDS_CREDENTIALS: &str = r#"
global_settings:
  proxy_port: 8888
  image: qmcgaw/gluetun
vpn_providers:
  pia:
    num_containers: 2
    required_env:
      OPENVPN_USER: TFCLI_NEVER_SET_USER
"#;

#[test]
fn help_shows_commands() {
    tunnelfleet_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("up"))
        .stdout(predicate::str::contains("down"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("interactive"));
}

#[test]
fn run_without_command_is_a_usage_error() {
    tunnelfleet_cmd()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn missing_config_reports_kind() {
    let temp_dir = tempfile::tempdir().unwrap();

    tunnelfleet_cmd()
        .current_dir(temp_dir.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error [config]:"))
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn invalid_config_names_the_key() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("tunnelfleet.yml");
    fs::write(
        &config_path,
        NEEDS_CREDENTIALS.replace("num_containers: 2", "num_containers: 0"),
    )
    .unwrap();

    tunnelfleet_cmd()
        .arg("--config")
        .arg(&config_path)
        .arg("up")
        .assert()
        .failure()
        .stderr(predicate::str::contains("vpn_providers.pia.num_containers"));
}

#[test]
fn missing_credential_aborts_before_writing() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("tunnelfleet.yml"), NEEDS_CREDENTIALS).unwrap();

    tunnelfleet_cmd()
        .current_dir(temp_dir.path())
        .env_remove("TFCLI_NEVER_SET_USER")
        .env_remove("PIA_TFCLI_NEVER_SET_USER")
        .arg("up")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error [credentials]:"))
        .stderr(predicate::str::contains("$PIA_TFCLI_NEVER_SET_USER"));

    assert!(!temp_dir.path().join("docker-compose.yml").exists());
    assert!(!temp_dir.path().join("haproxy.cfg").exists());
}

#[test]
fn json_errors_are_machine_readable() {
    let temp_dir = tempfile::tempdir().unwrap();

    tunnelfleet_cmd()
        .current_dir(temp_dir.path())
        .args(["--json", "down"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(r#""event":"error""#))
        .stderr(predicate::str::contains(r#""kind":"config""#));
}
