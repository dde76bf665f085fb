use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_cli_solves_from_stdin() {
    let mut cmd = Command::cargo_bin("nurikabe").unwrap();
    cmd.write_stdin("3-3\n---\n---\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("3X3\nOXO\nOXO"))
        .stdout(predicate::str::contains("solved"));
}

#[test]
fn test_cli_reports_not_solved() {
    let mut cmd = Command::cargo_bin("nurikabe").unwrap();
    cmd.write_stdin("2-\n--\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("not solved"));
}

#[test]
fn test_cli_rejects_ragged_input() {
    let mut cmd = Command::cargo_bin("nurikabe").unwrap();
    cmd.write_stdin("3-3\n--\n---\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("different length"));
}

#[test]
fn test_cli_prints_stats() {
    let mut cmd = Command::cargo_bin("nurikabe").unwrap();
    cmd.arg("--stats")
        .write_stdin("1-\n--\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("path rounds"));
}
