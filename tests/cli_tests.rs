//! CLI integration tests
//!
//! These tests verify the CLI commands work correctly by running the binary.

#![cfg(feature = "cli")]

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

fn jadn_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_jadn"))
}

fn fixtures_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(jadn_bin())
        .args(args)
        .output()
        .expect("Failed to execute command")
}

// ============================================================================
// Convert Command Tests
// ============================================================================

#[test]
fn test_cli_convert_file() {
    let out = TempDir::new().unwrap();
    let input = fixtures_dir().join("music.jidl");
    let output = run(&[
        "convert",
        "-f",
        "jadn",
        input.to_str().unwrap(),
        out.path().to_str().unwrap(),
    ]);

    assert!(output.status.success(), "convert should succeed");
    let written = out.path().join("music.jadn");
    let text = fs::read_to_string(&written).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).expect("Output should be valid JSON");
    assert_eq!(json["meta"]["title"], "Music Library");
    assert_eq!(json["types"].as_array().unwrap().len(), 12);
}

#[test]
fn test_cli_convert_directory_with_style() {
    let out = TempDir::new().unwrap();
    let output = run(&[
        "convert",
        "-f",
        "atree",
        "--style",
        "detail:logical",
        fixtures_dir().to_str().unwrap(),
        out.path().to_str().unwrap(),
    ]);

    assert!(output.status.success(), "convert of a directory should succeed");
    let tree = fs::read_to_string(out.path().join("music.txt")).unwrap();
    assert!(tree.starts_with(" Library = MapOf\n"));
    assert!(out.path().join("messages.txt").exists());
    assert!(out.path().join("shapes.txt").exists());
}

#[test]
fn test_cli_convert_unsupported_is_skipped() {
    let out = TempDir::new().unwrap();
    let input = fixtures_dir().join("music.jidl");
    let output = run(&["convert", "-f", "xsd", input.to_str().unwrap(), out.path().to_str().unwrap()]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "unsupported formats are skipped, not failures");
    assert!(stdout.contains("skipped"));
}

#[test]
fn test_cli_convert_malformed_input_fails() {
    let dir = TempDir::new().unwrap();
    let bad = dir.path().join("bad.jidl");
    fs::write(&bad, "Thing = Widget\n").unwrap();
    let output = run(&["convert", bad.to_str().unwrap(), dir.path().join("out").to_str().unwrap()]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("unknown core type"));
}

#[test]
fn test_cli_convert_rejects_bad_style() {
    let out = TempDir::new().unwrap();
    let input = fixtures_dir().join("music.jidl");
    let output = run(&[
        "convert",
        "--style",
        "colour:red",
        input.to_str().unwrap(),
        out.path().to_str().unwrap(),
    ]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_convert_strict_rejects_unchecked_schema() {
    let dir = TempDir::new().unwrap();
    let loose = dir.path().join("loose.jidl");
    fs::write(&loose, "Point = Record\n   1 x Missing\n").unwrap();
    let out = dir.path().join("out");

    let output = run(&["convert", loose.to_str().unwrap(), out.to_str().unwrap()]);
    assert!(output.status.success(), "unchecked schemas convert by default");

    let output = run(&["convert", "--strict", loose.to_str().unwrap(), out.to_str().unwrap()]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("type 'Missing' is not defined"));
}

// ============================================================================
// Deps / Check / Formats Command Tests
// ============================================================================

#[test]
fn test_cli_deps() {
    let output = run(&["deps", fixtures_dir().join("music.jidl").to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Roots: Library"));
    assert!(stdout.contains("  Library -> Barcode, Album"));
    assert!(!stdout.contains("Cycles:"));
}

#[test]
fn test_cli_check() {
    let output = run(&["check", fixtures_dir().join("messages.jidl").to_str().unwrap()]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stdout));

    let dir = TempDir::new().unwrap();
    let bad = dir.path().join("bad.jidl");
    fs::write(&bad, "lower = Record\n   1 a Missing\n").unwrap();
    let output = run(&["check", bad.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!output.status.success());
    assert!(stdout.contains("type 'Missing' is not defined"));
}

#[test]
fn test_cli_formats() {
    let output = run(&["formats"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("jidl"));
    assert!(stdout.contains("xeto"));
}
