//! CLI integration tests for dbfixture.
//!
//! These tests verify command-line argument parsing, help output,
//! exit codes, and the skip path, which must succeed without any
//! database available.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the dbfixture binary.
fn cmd() -> Command {
    Command::cargo_bin("dbfixture").unwrap()
}

fn config_with(extra: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "connection:\n  host: localhost\n  database: fixtures\n  user: ci\n  password: secret"
    )
    .unwrap();
    write!(file, "{}", extra).unwrap();
    file
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("operation"));
}

#[test]
fn test_export_subcommand_help() {
    cmd()
        .args(["export", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dest"))
        .stdout(predicate::str::contains("--format"))
        .stdout(predicate::str::contains("--skip"));
}

#[test]
fn test_operation_subcommand_help() {
    cmd()
        .args(["operation", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--type"))
        .stdout(predicate::str::contains("--transaction"))
        .stdout(predicate::str::contains("--clear-all-tables"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dbfixture"));
}

#[test]
fn test_config_default_path() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("[default: dbfixture.yaml]"));
}

// =============================================================================
// Exit Code Tests
// =============================================================================

#[test]
fn test_missing_config_exits_with_code_7() {
    // Missing file is an IO error (code 7), not a config error (code 1)
    cmd()
        .args(["--config", "nonexistent_config.yaml", "export"])
        .assert()
        .code(7);
}

#[test]
fn test_invalid_yaml_exits_with_code_1() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "invalid: yaml: content: [").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "export"])
        .assert()
        .code(1);
}

#[test]
fn test_missing_required_fields_exits_with_code_1() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "connection:").unwrap();
    writeln!(file, "  host: localhost").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "export"])
        .assert()
        .code(1);
}

#[test]
fn test_export_without_export_section_exits_with_code_1() {
    let file = config_with("");

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "export"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no export section"));
}

#[test]
fn test_unknown_format_override_exits_with_code_1() {
    let file = config_with("export:\n  dest: out.xml\n  skip: true\n");

    cmd()
        .args([
            "--config",
            file.path().to_str().unwrap(),
            "export",
            "--format",
            "parquet",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown dataset format"));
}

// =============================================================================
// Skip Path Tests (no database required)
// =============================================================================

#[test]
fn test_export_skip_succeeds_without_database() {
    let file = config_with("export:\n  dest: out.xml\n  skip: true\n");

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "export"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Export skipped"));
}

#[test]
fn test_export_skip_flag_overrides_config() {
    let file = config_with("export:\n  dest: out.xml\n");

    cmd()
        .args([
            "--config",
            file.path().to_str().unwrap(),
            "export",
            "--skip",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Export skipped"));
}

#[test]
fn test_operation_skip_succeeds_without_database() {
    let file = config_with(
        "operation:\n  type: CLEAN_INSERT\n  sources: [seed.xml]\n  skip: true\n",
    );

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "operation"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Operation CLEAN_INSERT skipped"));
}

#[test]
fn test_skip_summary_as_json() {
    let file = config_with("export:\n  dest: out.xml\n  skip: true\n");

    cmd()
        .args([
            "--config",
            file.path().to_str().unwrap(),
            "--output-json",
            "export",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"skipped\": true"));
}
