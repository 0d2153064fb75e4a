//! E2E CLI tests covering:
//! - Usage text for every argument count other than two
//! - Offset adjustment, insertion and the zero-delta warning
//! - Error messages and exit codes for unreadable simfiles
//!
//! Each test runs `smoffset` as a subprocess in an isolated temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

/// Build a Command targeting the smoffset binary, rooted in `dir`.
fn smoffset_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("smoffset"));
    cmd.current_dir(dir);
    cmd.env("RUST_LOG", "error");
    cmd
}

/// Write a simfile into `dir` and return its path.
fn write_simfile(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write simfile");
    path
}

// ---------------------------------------------------------------------------
// Usage
// ---------------------------------------------------------------------------

#[test]
fn no_arguments_prints_usage_and_succeeds() {
    let dir = TempDir::new().unwrap();
    smoffset_cmd(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("smoffset simfile delta"));
}

#[test]
fn one_argument_prints_usage_and_succeeds() {
    let dir = TempDir::new().unwrap();
    let path = write_simfile(&dir, "song.sm", "#OFFSET:0.5;\n");

    smoffset_cmd(dir.path())
        .arg("song.sm")
        .assert()
        .success()
        .stdout(predicate::str::contains("Adjusts the offset of a Stepmania simfile."));

    assert_eq!(fs::read_to_string(&path).unwrap(), "#OFFSET:0.5;\n");
}

#[test]
fn three_arguments_print_usage_and_leave_file_alone() {
    let dir = TempDir::new().unwrap();
    let path = write_simfile(&dir, "song.sm", "#OFFSET:0.5;\n");

    smoffset_cmd(dir.path())
        .args(["song.sm", "0.1", "0.2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("smoffset simfile delta"));

    assert_eq!(fs::read_to_string(&path).unwrap(), "#OFFSET:0.5;\n");
}

#[test]
fn help_and_version_are_just_one_argument() {
    let dir = TempDir::new().unwrap();
    for flag in ["--help", "--version"] {
        smoffset_cmd(dir.path())
            .arg(flag)
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "The amount, in seconds, to add to the offset.",
            ));
    }
}

// ---------------------------------------------------------------------------
// Adjustment
// ---------------------------------------------------------------------------

#[test]
fn adjusts_existing_offset() {
    let dir = TempDir::new().unwrap();
    let path = write_simfile(&dir, "song.sm", "#TITLE:Song;\n#OFFSET:-0.050000;\n#BPMS:0=120;\n");

    smoffset_cmd(dir.path())
        .args(["song.sm", "0.1"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "#TITLE:Song;\n#OFFSET:0.050000;\n#BPMS:0=120;\n"
    );
}

#[test]
fn negative_delta_inserts_missing_offset() {
    let dir = TempDir::new().unwrap();
    let path = write_simfile(&dir, "song.ssc", "A\nB\n");

    smoffset_cmd(dir.path())
        .args(["song.ssc", "-5"])
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&path).unwrap(), "#OFFSET:-5.000000;\nA\nB\n");
}

#[test]
fn repeated_runs_accumulate() {
    let dir = TempDir::new().unwrap();
    let path = write_simfile(&dir, "song.sm", "#OFFSET:0.000000;\n");

    smoffset_cmd(dir.path()).args(["song.sm", "0.25"]).assert().success();
    smoffset_cmd(dir.path()).args(["song.sm", "-0.5"]).assert().success();

    assert_eq!(fs::read_to_string(&path).unwrap(), "#OFFSET:-0.250000;\n");
}

#[test]
fn unparseable_delta_warns_and_proceeds() {
    let dir = TempDir::new().unwrap();
    let path = write_simfile(&dir, "song.sm", "#OFFSET:0.009000;\n#NOTES:\n");

    smoffset_cmd(dir.path())
        .args(["song.sm", "abc"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "WARNING: 0 offset. Offset will not be adjusted.",
        ));

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "#OFFSET:0.009000;\n#NOTES:\n"
    );
}

#[test]
fn absolute_path_outside_working_dir() {
    let dir = TempDir::new().unwrap();
    let elsewhere = TempDir::new().unwrap();
    let path = write_simfile(&elsewhere, "song.sm", "#OFFSET:1;\n");

    smoffset_cmd(dir.path())
        .arg(&path)
        .arg("1")
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&path).unwrap(), "#OFFSET:2.000000;\n");
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn flag_lookalike_delta_is_zero() {
    let dir = TempDir::new().unwrap();
    let path = write_simfile(&dir, "a.sm", "#OFFSET:1;\n");

    for delta in ["--help", "--"] {
        smoffset_cmd(dir.path())
            .args(["a.sm", delta])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "WARNING: 0 offset. Offset will not be adjusted.",
            ));
    }

    assert_eq!(fs::read_to_string(&path).unwrap(), "#OFFSET:1.000000;\n");
}

#[test]
fn hyphenated_simfile_name() {
    let dir = TempDir::new().unwrap();
    let path = write_simfile(&dir, "-a.sm", "#OFFSET:1;\n");

    smoffset_cmd(dir.path())
        .args(["-a.sm", "1"])
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&path).unwrap(), "#OFFSET:2.000000;\n");
}

#[test]
fn hex_delta_is_accepted() {
    let dir = TempDir::new().unwrap();
    let path = write_simfile(&dir, "a.sm", "#OFFSET:1;\n");

    smoffset_cmd(dir.path())
        .args(["a.sm", "0x1"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert_eq!(fs::read_to_string(&path).unwrap(), "#OFFSET:2.000000;\n");
}

#[test]
fn malformed_log_filter_is_ignored() {
    let dir = TempDir::new().unwrap();
    let path = write_simfile(&dir, "a.sm", "#OFFSET:1;\n");

    smoffset_cmd(dir.path())
        .env("RUST_LOG", "foo=notalevel")
        .args(["a.sm", "1"])
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&path).unwrap(), "#OFFSET:2.000000;\n");
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn missing_simfile_fails_without_side_effects() {
    let dir = TempDir::new().unwrap();

    smoffset_cmd(dir.path())
        .args(["missing.sm", "0.1"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("missing.sm"))
        .stdout(predicate::str::contains("ERROR: simfile could not be opened!"));

    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn missing_simfile_is_reported_before_zero_delta_warning() {
    let dir = TempDir::new().unwrap();

    smoffset_cmd(dir.path())
        .args(["missing.sm", "0"])
        .assert()
        .failure()
        .stdout(predicate::str::starts_with("missing.sm\nERROR: simfile could not be opened!"))
        .stdout(predicate::str::contains("WARNING").not());
}

#[test]
fn directory_target_fails() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("songs")).unwrap();

    smoffset_cmd(dir.path())
        .args(["songs", "0.1"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("ERROR: simfile could not be opened!"));
}
