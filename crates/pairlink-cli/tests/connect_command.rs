use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn pairlink_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("pairlink")
}

#[test]
fn test_connect_help_lists_options() {
    Command::new(pairlink_bin())
        .args(["connect", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--session-file"))
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--no-open"))
        .stdout(predicate::str::contains("--headless"))
        .stdout(predicate::str::contains("--attach"))
        .stdout(predicate::str::contains("--chrome-path"));
}

#[test]
fn test_connect_survives_missing_browser() {
    let temp_dir = tempfile::tempdir().unwrap();
    let session_file = temp_dir.path().join("session-id.txt");

    Command::new(pairlink_bin())
        .arg("connect")
        .arg("--session-file")
        .arg(&session_file)
        .arg("--no-open")
        .arg("--chrome-path")
        .arg("/nonexistent/chrome")
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated session ID"))
        .stdout(predicate::str::contains("Chrome not found"))
        .stdout(predicate::str::contains("Stopped (failed)"));

    let id = std::fs::read_to_string(&session_file).unwrap();
    assert_eq!(id.len(), 8);
}

#[test]
fn test_connect_fails_fast_without_identity_storage() {
    let temp_dir = tempfile::tempdir().unwrap();
    let session_file = temp_dir.path().join("missing").join("session-id.txt");

    Command::new(pairlink_bin())
        .arg("connect")
        .arg("--session-file")
        .arg(&session_file)
        .arg("--chrome-path")
        .arg("/nonexistent/chrome")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot establish session identity"));
}

#[test]
fn test_headless_conflicts_with_attach() {
    Command::new(pairlink_bin())
        .args(["connect", "--headless", "--attach", "9222"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
