//! Tests for the `sqs` binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn sqs() -> Command {
    let mut cmd = Command::cargo_bin("sqs").unwrap();
    for var in [
        "AWS_ACCESS_KEY_ID",
        "AWS_ACCESS_KEY",
        "AWS_SECRET_ACCESS_KEY",
        "AWS_SECRET_KEY",
        "SQS_CLIENT_CONFIG",
        "SQS_CLIENT_ACCESS_KEY",
        "SQS_CLIENT_SECRET_KEY",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    sqs()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("change-visibility"))
        .stdout(predicate::str::contains("add-permission"));
}

#[test]
fn test_missing_credentials_exit_code() {
    sqs()
        .args(["--endpoint", "http://127.0.0.1:1", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("AWS_ACCESS_KEY_ID"));
}

#[test]
fn test_missing_config_file_exit_code() {
    sqs()
        .args(["--config", "/nonexistent/sqs.toml", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn test_unreachable_service_exit_code() {
    sqs()
        .env("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE")
        .env("AWS_SECRET_ACCESS_KEY", "secret")
        .args(["--endpoint", "http://127.0.0.1:1", "--timeout", "5", "list"])
        .assert()
        .code(5);
}
