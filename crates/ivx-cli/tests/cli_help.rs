use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("ivx")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("session"))
        .stdout(predicate::str::contains("history"))
        .stdout(predicate::str::contains("health"));
}

#[test]
fn test_help_shows_interview_flags() {
    cargo_bin_cmd!("ivx")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--role"))
        .stdout(predicate::str::contains("--name"))
        .stdout(predicate::str::contains("--api-url"));
}

#[test]
fn test_session_help_requires_id() {
    cargo_bin_cmd!("ivx")
        .args(["session", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SESSION_ID"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("ivx")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1"));
}
