use super::common::cmd;
use predicates::prelude::*;

#[test]
fn test_help_flag() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("code-insight"))
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_subcommands_listed() {
    let output = cmd().arg("--help").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["decode", "stack", "modules", "apply-edit", "lookup"] {
        assert!(stdout.contains(name), "missing subcommand {name}");
    }
}

#[test]
fn test_stack_help() {
    cmd()
        .args(["stack", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Show the call stack"))
        .stdout(predicate::str::contains("--index"));
}

#[test]
fn test_apply_edit_help() {
    cmd()
        .args(["apply-edit", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--source-map"))
        .stdout(predicate::str::contains("--generated-output"));
}

#[test]
fn test_missing_subcommand_fails() {
    cmd().assert().failure();
}

#[test]
fn test_quiet_conflicts_with_verbose() {
    cmd()
        .args(["-q", "-v", "decode", "trace.bin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
