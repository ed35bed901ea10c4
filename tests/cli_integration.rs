//! CLI Integration Tests
//!
//! End-to-end tests for CLI commands using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the modelgate binary for testing, isolated from the caller's env
fn modelgate_cmd() -> Command {
    let mut cmd = Command::cargo_bin("modelgate").unwrap();
    for var in [
        "MODELGATE_BACKENDS",
        "MODELGATE_PORT",
        "MODELGATE_HOST",
        "MODELGATE_ACCESS_TOKENS",
        "MODELGATE_LOG_FORMAT",
        "MODELGATE_LOG_LEVEL",
        "MODELGATE_PAYLOAD_LIMIT",
        "MODELGATE_REFRESH_INTERVAL",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_version_output() {
    modelgate_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("modelgate"));
}

#[test]
fn test_help_shows_all_commands() {
    modelgate_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("models"))
        .stdout(predicate::str::contains("backends"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_serve_help() {
    modelgate_cmd()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--backend"))
        .stdout(predicate::str::contains("--refresh-interval"));
}

#[test]
fn test_serve_without_backends_fails_validation() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("modelgate.toml");
    std::fs::write(&config_path, "[server]\nport = 18080\n").unwrap();

    modelgate_cmd()
        .args(["serve", "-c", config_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("backends"));
}

#[test]
fn test_backends_lists_config_without_credentials() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("modelgate.toml");
    std::fs::write(
        &config_path,
        "backends = [\"http://a.internal:9000\", \"https://b.example.com/openai/v1|top-secret\"]\n",
    )
    .unwrap();

    modelgate_cmd()
        .args(["backends", "--json", "-c", config_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://a.internal:9000"))
        .stdout(predicate::str::contains("/openai/v1"))
        .stdout(predicate::str::contains("\"has_credential\": true"))
        .stdout(predicate::str::contains("top-secret").not());
}

#[test]
fn test_backends_from_env() {
    modelgate_cmd()
        .args(["backends", "--json", "-c", "does-not-exist.toml"])
        .env("MODELGATE_BACKENDS", "http://a:9000,http://b:9000")
        .assert()
        .success()
        .stdout(predicate::str::contains("http://a:9000"))
        .stdout(predicate::str::contains("http://b:9000"));
}

#[test]
fn test_models_with_unreachable_backend_prints_empty_list() {
    modelgate_cmd()
        .args(["models", "--json", "-c", "does-not-exist.toml"])
        .env("MODELGATE_BACKENDS", "http://127.0.0.1:1")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"models\": []"));
}

#[test]
fn test_config_init_creates_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("modelgate.toml");

    modelgate_cmd()
        .args(["config", "init", "-o", config_path.to_str().unwrap()])
        .assert()
        .success();

    assert!(config_path.exists());
    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[server]"));
    assert!(content.contains("backends"));
}

#[test]
fn test_config_init_no_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("modelgate.toml");

    std::fs::write(&config_path, "existing content").unwrap();

    modelgate_cmd()
        .args(["config", "init", "-o", config_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exists"));
}

#[test]
fn test_config_init_then_backends_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("modelgate.toml");

    modelgate_cmd()
        .args(["config", "init", "-o", config_path.to_str().unwrap()])
        .assert()
        .success();

    modelgate_cmd()
        .args(["backends", "-c", config_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("localhost:11434"));
}

#[test]
fn test_invalid_command() {
    modelgate_cmd()
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_completions_bash() {
    modelgate_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("complete"));
}

#[test]
fn test_completions_zsh() {
    modelgate_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("compdef"));
}
