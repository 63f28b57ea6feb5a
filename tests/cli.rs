//! CLI surface: argument parsing, init, and config file handling.
//!
//! Nothing here needs a running server — connection attempts are exercised
//! only through paths that fail before any call is opened.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn sayhi() -> Command {
    Command::cargo_bin("sayhi").unwrap()
}

#[test]
fn help_lists_the_four_patterns() {
    sayhi()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("unary"))
        .stdout(predicate::str::contains("client-stream"))
        .stdout(predicate::str::contains("server-stream"))
        .stdout(predicate::str::contains("bidi"));
}

#[test]
fn unary_requires_a_sender() {
    sayhi().arg("unary").assert().failure();
}

#[test]
fn rejects_an_unparsable_duration() {
    sayhi()
        .args(["bidi", "Dave", "--interval", "soon"])
        .assert()
        .failure();
}

#[test]
fn init_writes_a_starter_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sayhi.toml");

    sayhi()
        .args(["init", path.to_str().unwrap()])
        .assert()
        .success();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("[target]"));
    assert!(content.contains("[session]"));
    assert!(content.contains("sayhi.SayHiService"));
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sayhi.toml");
    fs::write(&path, "existing").unwrap();

    sayhi()
        .args(["init", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    sayhi()
        .args(["init", path.to_str().unwrap(), "--force"])
        .assert()
        .success();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("[target]"));
}

#[test]
fn rejects_a_missing_config_file() {
    sayhi()
        .args(["unary", "Alice", "-f", "/nonexistent/sayhi.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn rejects_a_malformed_config_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[target\naddress =").unwrap();

    sayhi()
        .args(["unary", "Alice", "-f", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}
