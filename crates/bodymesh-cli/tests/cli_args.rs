//! CLI argument validation tests.

#![allow(clippy::unwrap_used)]

mod common;

use predicates::prelude::*;

use common::bodymesh;

#[test]
fn test_no_subcommand_shows_usage() {
    let dir = tempfile::tempdir().unwrap();
    bodymesh(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_help_lists_subcommands() {
    let dir = tempfile::tempdir().unwrap();
    bodymesh(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("measure")
                .and(predicate::str::contains("create"))
                .and(predicate::str::contains("serve")),
        );
}

#[test]
fn test_version_flag() {
    let dir = tempfile::tempdir().unwrap();
    bodymesh(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("bodymesh "));
}

#[test]
fn test_measure_requires_height() {
    let dir = tempfile::tempdir().unwrap();
    bodymesh(dir.path())
        .args(["measure", "--front", "f.json", "--side", "s.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--height"));
}

#[test]
fn test_measure_rejects_non_numeric_height() {
    let dir = tempfile::tempdir().unwrap();
    bodymesh(dir.path())
        .args(["measure", "--front", "f.json", "--side", "s.json", "--height", "tall"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'tall'"));
}

#[test]
fn test_create_requires_gender() {
    let dir = tempfile::tempdir().unwrap();
    bodymesh(dir.path())
        .args(["create", "--front", "a.jpg", "--side", "b.jpg", "--back", "c.jpg"])
        .args(["--height", "170"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--gender"));
}

#[test]
fn test_create_missing_image() {
    let dir = tempfile::tempdir().unwrap();
    bodymesh(dir.path())
        .args(["create", "--front", "a.jpg", "--side", "b.jpg", "--back", "c.jpg"])
        .args(["--height", "170", "--gender", "male"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to read a.jpg"));
}

#[test]
fn test_serve_help_lists_endpoint_flags() {
    let dir = tempfile::tempdir().unwrap();
    bodymesh(dir.path())
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--record-store-url")
                .and(predicate::str::contains("BODYMESH_RECONSTRUCTION_API_KEY")),
        );
}
