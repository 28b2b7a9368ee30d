//! Binary-level tests for the rulehub CLI

use assert_cmd::Command;
use predicates::prelude::*;

fn rulehub() -> Command {
    Command::cargo_bin("rulehub").unwrap()
}

#[test]
fn help_lists_subcommands() {
    rulehub()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("route"))
        .stdout(predicate::str::contains("doctor"));
}

#[test]
fn test_command_without_install_is_graceful() {
    let tmp = tempfile::tempdir().unwrap();
    rulehub()
        .current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .args(["test", "write a commit message"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no installation found"));
}

#[test]
fn init_then_test_selects_commit_rules() {
    let tmp = tempfile::tempdir().unwrap();

    rulehub()
        .current_dir(tmp.path())
        .env("HOME", tmp.path())
        .args(["init", "--copy"])
        .assert()
        .success();

    rulehub()
        .current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("SEMANTIC_ROUTER_ENABLED")
        .args(["test", "write a commit message", "--keyword"])
        .assert()
        .success()
        .stdout(predicate::str::contains("keyword matching"))
        .stdout(predicate::str::contains("rules/commit.md"))
        .stdout(predicate::str::contains("commands/commit.md"));
}

#[test]
fn route_parks_undesired_rules() {
    let tmp = tempfile::tempdir().unwrap();

    rulehub()
        .current_dir(tmp.path())
        .env("HOME", tmp.path())
        .args(["init", "--copy"])
        .assert()
        .success();

    // a commit prompt should park the testing rule and keep commit active
    rulehub()
        .current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("SEMANTIC_ROUTER_ENABLED")
        .args(["route", "write a commit message"])
        .assert()
        .success();

    let claude = tmp.path().join(".claude");
    assert!(claude.join("rules/commit.md").exists());
    assert!(claude.join("rules/essential.md").exists());
    assert!(claude.join("rules/security.md").exists());
    assert!(claude.join("rules-inactive/testing.md").exists());
    assert!(!claude.join("rules/testing.md").exists());
}

#[test]
fn doctor_runs_without_install() {
    let tmp = tempfile::tempdir().unwrap();
    rulehub()
        .current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("no installation found"));
}

#[test]
fn list_without_install_hints_at_init() {
    let tmp = tempfile::tempdir().unwrap();
    rulehub()
        .current_dir(tmp.path())
        .env("HOME", tmp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("rulehub init"));
}
