//! Tests for the `regclause` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_regclause"))
}

#[test]
fn test_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate-all"));
}

#[test]
fn test_list_shows_builtin_parsers() {
    cli()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("uk:FCA_CONC"))
        .stdout(predicate::str::contains("uk:FCA_FG21"))
        .stdout(predicate::str::contains("eu:EBA_GL_2020_06"))
        .stdout(predicate::str::contains("EUEBAGl202006Parser v1.0.0"));
}

#[test]
fn test_parse_unknown_jurisdiction() {
    cli()
        .args(["parse", "us"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "Error: No parsers available for jurisdiction: us. Available jurisdictions: uk, eu",
        ));
}

#[test]
fn test_parse_missing_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("CONC.pdf");

    cli()
        .args(["parse", "uk", "FCA_CONC", "--file"])
        .arg(&missing)
        .arg("--output")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse document for uk:FCA_CONC"))
        .stderr(predicate::str::contains("Regulation file not found"));
}

#[test]
fn test_parse_rejects_malformed_section() {
    cli()
        .args(["parse", "uk", "--section", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Expected ID=Title"));
}

#[test]
fn test_detect_missing_file() {
    cli()
        .args(["detect", "does-not-exist.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No suitable parser found for file"));
}

#[test]
fn test_generate_all_without_documents() {
    let dir = TempDir::new().unwrap();

    cli()
        .current_dir(dir.path())
        .args(["generate-all", "--output", "parsed"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Generated: 0"))
        .stderr(predicate::str::contains("No files were generated"));
}
