//! Integration tests for the sailinit binary
//!
//! Each test runs the real binary with HOME pointed at a temp directory, so
//! the registry file lives in `$HOME/.laravel-sail-ports.json`.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn sailinit(home: &Path, cwd: &Path, args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_sailinit"))
        .args(args)
        .current_dir(cwd)
        .env("HOME", home)
        .env("NO_COLOR", "1")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to run sailinit");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn registry_path(home: &Path) -> std::path::PathBuf {
    home.join(".laravel-sail-ports.json")
}

#[test]
fn test_version_output() {
    let temp_dir = TempDir::new().unwrap();
    let output = sailinit(temp_dir.path(), temp_dir.path(), &["--version"], "");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("sailinit "));
}

#[test]
fn test_list_without_registry() {
    let temp_dir = TempDir::new().unwrap();
    let output = sailinit(temp_dir.path(), temp_dir.path(), &["--list"], "");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No registered projects found."));
    assert!(!registry_path(temp_dir.path()).exists());
}

#[test]
fn test_list_sorted_by_suffix_with_status() {
    let temp_dir = TempDir::new().unwrap();
    let live = temp_dir.path().join("live");
    fs::create_dir_all(&live).unwrap();
    let json = format!(
        r#"{{"max_suffix": 60, "projects": {{"{}": 60, "/definitely/missing/project": 12}}}}"#,
        live.display()
    );
    fs::write(registry_path(temp_dir.path()), json).unwrap();

    let output = sailinit(temp_dir.path(), temp_dir.path(), &["--list"], "");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines[0].starts_with("Project"));
    assert!(lines[1].starts_with("/definitely/missing/project"));
    assert!(lines[1].contains("8012"));
    assert!(lines[1].contains("[X] Missing"));
    assert!(lines[2].contains("8060"));
    assert!(lines[2].contains("3360"));
    assert!(lines[2].trim_end().ends_with("OK"));
}

#[test]
fn test_clean_removes_missing_projects() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        registry_path(temp_dir.path()),
        r#"{"max_suffix": 12, "projects": {"/definitely/missing/project": 12}}"#,
    )
    .unwrap();

    let output = sailinit(temp_dir.path(), temp_dir.path(), &["--clean"], "");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Removing orphaned project: /definitely/missing/project (suffix 12)"));
    assert!(stdout.contains("Cleaned 1 orphaned project(s)"));

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(registry_path(temp_dir.path())).unwrap()).unwrap();
    assert_eq!(saved["max_suffix"], 12);
    assert!(saved["projects"].as_object().unwrap().is_empty());
}

#[test]
fn test_remove_unregistered_project_fails() {
    let temp_dir = TempDir::new().unwrap();
    let output = sailinit(temp_dir.path(), temp_dir.path(), &["--remove"], "");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Error removing project"));
    assert!(stdout.contains("Project not registered"));
}

#[test]
fn test_corrupt_registry_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(registry_path(temp_dir.path()), "{oops").unwrap();

    let output = sailinit(temp_dir.path(), temp_dir.path(), &["--list"], "");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Failed to read port registry"));
    assert_eq!(fs::read_to_string(registry_path(temp_dir.path())).unwrap(), "{oops");
}

#[test]
fn test_modes_are_exclusive() {
    let temp_dir = TempDir::new().unwrap();
    let output = sailinit(temp_dir.path(), temp_dir.path(), &["--list", "--clean"], "");
    assert!(!output.status.success());
}

#[test]
fn test_stop_without_sail_fails() {
    let temp_dir = TempDir::new().unwrap();
    let output = sailinit(temp_dir.path(), temp_dir.path(), &["--stop"], "");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Sail binary not found"));
}

#[test]
fn test_dry_run_first_setup_changes_nothing() {
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    // First-run prompt: Enter (48); confirm: Enter; busy ports (if any): y
    let output = sailinit(home.path(), project.path(), &["--dry-run", "84"], "\n\ny\n");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("First-ever setup detected."));
    assert!(stdout.contains("[dry-run] Would save suffix 48"));
    assert!(stdout.contains("[dry-run]   APP_PORT=8048"));
    assert!(stdout.contains("[dry-run]   FORWARD_MAILPIT_DASHBOARD_PORT=18148"));

    assert!(!registry_path(home.path()).exists());
    assert!(!project.path().join(".env").exists());
}

#[test]
fn test_dry_run_uses_suffix_from_env() {
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    fs::write(project.path().join(".env"), "APP_PORT=8051\n").unwrap();

    let output = sailinit(home.path(), project.path(), &["--dry-run", "84"], "\ny\n");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Detected existing port suffix: 51"));
    assert!(stdout.contains("[dry-run] Would save suffix 51"));
    assert!(!stdout.contains("First-ever setup detected."));
}
