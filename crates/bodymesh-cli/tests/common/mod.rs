//! Shared helpers for CLI integration tests.

#![allow(dead_code, clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use bodymesh_core::domain::LandmarkSet;
use bodymesh_test_support::LandmarkSetBuilder;

/// A `bodymesh` command isolated from the caller's home, config and environment.
pub fn bodymesh(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bodymesh").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("xdg"))
        .env_remove("RUST_LOG");
    for var in [
        "BODYMESH_RECORD_STORE_URL",
        "BODYMESH_RECONSTRUCTION_URL",
        "BODYMESH_RECONSTRUCTION_API_KEY",
        "BODYMESH_REGISTER_URL",
        "BODYMESH_SIZE_URL",
        "BODYMESH_POSE_URL",
        "BODYMESH_MATTING_URL",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

pub fn write_set(dir: &Path, name: &str, set: &LandmarkSet) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string(set).unwrap()).unwrap();
    path
}

/// Writes front and side views of the default 170 cm figure.
pub fn write_figure(dir: &Path, builder: &LandmarkSetBuilder) -> (PathBuf, PathBuf) {
    (
        write_set(dir, "front.json", &builder.front()),
        write_set(dir, "side.json", &builder.side()),
    )
}

/// Runs `measure` on the default figure and returns parsed stdout.
pub fn measure_json(cmd: &mut Command, dir: &Path) -> serde_json::Value {
    let (front, side) = write_figure(dir, &LandmarkSetBuilder::new());
    let output = cmd
        .arg("measure")
        .arg("--front")
        .arg(front)
        .arg("--side")
        .arg(side)
        .args(["--height", "170"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}
