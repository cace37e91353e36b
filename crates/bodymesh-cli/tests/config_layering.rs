//! Integration tests for configuration layering.
//!
//! Tests the priority chain: defaults < XDG config < project config < environment < CLI flags

#![allow(clippy::unwrap_used)]

mod common;

use std::fs;

use bodymesh_test_support::LandmarkSetBuilder;
use predicates::prelude::*;

use common::{bodymesh, measure_json, write_figure};

#[test]
fn test_project_config_enables_pretty_output() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(".bodymesh.toml"), "[output]\npretty = true\n").unwrap();
    let (front, side) = write_figure(dir.path(), &LandmarkSetBuilder::new());

    bodymesh(dir.path())
        .arg("measure")
        .arg("--front")
        .arg(front)
        .arg("--side")
        .arg(side)
        .args(["--height", "170"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\n  \"height_cm\""));
}

#[test]
fn test_project_config_tunes_quality_checks() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(".bodymesh.toml"),
        "[quality]\nmin_visibility = 0.99\n",
    )
    .unwrap();

    // Every point of the figure sits at 0.95.
    let record = measure_json(&mut bodymesh(dir.path()), dir.path());
    assert_eq!(record["quality"]["verdict"], "poor");
    assert_eq!(record["quality"]["issues"].as_array().unwrap().len(), 8);
}

#[test]
fn test_project_config_found_in_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(".bodymesh.toml"),
        "[quality]\nmin_visibility = 0.99\n",
    )
    .unwrap();
    let nested = dir.path().join("scans").join("today");
    fs::create_dir_all(&nested).unwrap();

    let mut cmd = bodymesh(dir.path());
    cmd.current_dir(&nested);
    let record = measure_json(&mut cmd, &nested);
    assert_eq!(record["quality"]["verdict"], "poor");
}

#[cfg(target_os = "linux")]
#[test]
fn test_project_config_overrides_xdg() {
    let dir = tempfile::tempdir().unwrap();
    let xdg = dir.path().join("xdg").join("bodymesh");
    fs::create_dir_all(&xdg).unwrap();
    fs::write(
        xdg.join("config.toml"),
        "[quality]\nmin_visibility = 0.99\n\n[output]\npretty = true\n",
    )
    .unwrap();

    let record = measure_json(&mut bodymesh(dir.path()), dir.path());
    assert_eq!(record["quality"]["verdict"], "poor");

    fs::write(
        dir.path().join(".bodymesh.toml"),
        "[quality]\nmin_visibility = 0.5\n",
    )
    .unwrap();
    let (front, side) = write_figure(dir.path(), &LandmarkSetBuilder::new());
    bodymesh(dir.path())
        .arg("measure")
        .arg("--front")
        .arg(front)
        .arg("--side")
        .arg(side)
        .args(["--height", "170"])
        .assert()
        .success()
        // Pretty survives from the XDG layer, visibility comes from the project.
        .stdout(predicate::str::contains("\"verdict\": \"excellent\""));
}

#[test]
fn test_invalid_config_value_warns() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(".bodymesh.toml"),
        "[quality]\nmin_visibility = 2.0\n",
    )
    .unwrap();
    let (front, side) = write_figure(dir.path(), &LandmarkSetBuilder::new());

    bodymesh(dir.path())
        .arg("measure")
        .arg("--front")
        .arg(front)
        .arg("--side")
        .arg(side)
        .args(["--height", "170"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "warning: quality.min_visibility must be 0.0-1.0",
        ));
}

#[test]
fn test_unparseable_config_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(".bodymesh.toml"), "[quality\nmin_visibility = 0.99\n").unwrap();

    let record = measure_json(&mut bodymesh(dir.path()), dir.path());
    assert_eq!(record["quality"]["verdict"], "excellent");
}

// === Service endpoints ===

fn write_images(dir: &std::path::Path) {
    for name in ["front.jpg", "side.jpg", "back.jpg"] {
        fs::write(dir.join(name), [0xFF_u8, 0xD8, 0xFF]).unwrap();
    }
}

fn create(cmd: &mut assert_cmd::Command) -> &mut assert_cmd::Command {
    cmd.args([
        "create", "--front", "front.jpg", "--side", "side.jpg", "--back", "back.jpg",
    ])
    .args(["--height", "170", "--gender", "female"])
}

#[test]
fn test_create_requires_api_key() {
    let dir = tempfile::tempdir().unwrap();
    write_images(dir.path());

    create(&mut bodymesh(dir.path()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No reconstruction API key"));
}

#[test]
fn test_env_supplies_api_key() {
    let dir = tempfile::tempdir().unwrap();
    write_images(dir.path());

    // Gets past the key check and stops at the missing pose endpoint.
    create(&mut bodymesh(dir.path()))
        .env("BODYMESH_RECONSTRUCTION_API_KEY", "from-env")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No pose detection endpoint"));
}

#[test]
fn test_config_file_supplies_endpoints() {
    let dir = tempfile::tempdir().unwrap();
    write_images(dir.path());
    fs::write(
        dir.path().join(".bodymesh.toml"),
        "[services]\nreconstruction_api_key = 'from-file'\npose_url = 'http://127.0.0.1:9/pose'\n",
    )
    .unwrap();

    // Nothing listens on the discard port, so detection is where it fails.
    create(&mut bodymesh(dir.path()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("pose detection failed for front view"));
}

#[test]
fn test_flag_overrides_config_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    write_images(dir.path());
    fs::write(
        dir.path().join(".bodymesh.toml"),
        "[services]\nreconstruction_api_key = 'from-file'\npose_url = 'not a url'\n",
    )
    .unwrap();

    create(&mut bodymesh(dir.path()))
        .args(["--pose-url", "http://127.0.0.1:9/pose"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("warning: services.pose_url")
                .and(predicate::str::contains("127.0.0.1:9/pose")),
        );
}
