//! Tests for the tracker binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn tracker() -> Command {
    let mut cmd = Command::cargo_bin("tracker").unwrap();
    cmd.env("TRACKER_NO_RC", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_version() {
    tracker()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("tracker "));
}

#[test]
fn test_help() {
    tracker()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("USAGE:"))
        .stdout(predicate::str::contains("environment [collection]"));
}

#[test]
fn test_single_statement() {
    tracker()
        .args(["-c", "1", "+", "2", "*", "3"])
        .assert()
        .success()
        .stdout("Result: 7\n");
}

#[test]
fn test_single_statement_error_fails() {
    tracker()
        .args(["-c", "1 / 0"])
        .assert()
        .failure()
        .stdout("Error: Can not divide by zero.\n");
}

#[test]
fn test_script() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("fight.scr");
    fs::write(
        &script,
        "# set up the fight\ncreate goblin.hp, 7\n\nset goblin.hp, [goblin.hp - 2]\nprint goblin.hp\n",
    )
    .unwrap();
    tracker()
        .arg(&script)
        .assert()
        .success()
        .stdout(
            "Variable ':goblin.hp' created.\n\
             Value of ':goblin.hp' set to '7'.\n\
             Value of ':goblin.hp' set to '5'.\n\
             5\n",
        );
}

#[test]
fn test_script_reports_failing_line() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("broken.scr");
    fs::write(&script, "print 1\nprint missing\nprint 3\n").unwrap();
    tracker()
        .arg(&script)
        .assert()
        .failure()
        .stdout("1\nError: No variable 'missing' exists in ':'.\n3\n")
        .stderr(predicate::str::contains("Error at line 2"));
}

#[test]
fn test_script_stops_at_quit() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("short.scr");
    fs::write(&script, "print 1\nquit\nprint 2\n").unwrap();
    tracker()
        .arg(&script)
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_missing_script() {
    tracker()
        .arg("no-such-file.scr")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error reading no-such-file.scr"));
}
