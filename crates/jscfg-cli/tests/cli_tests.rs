//! Integration tests for the `jscfg` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn jscfg(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_jscfg"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run jscfg")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn copy_fixture(name: &str, dir: &Path) -> PathBuf {
    let target = dir.join(name);
    std::fs::copy(fixtures_dir().join(name), &target).unwrap();
    target
}

const STRICT_ONLY_ERROR: &str = r#"{
  "body": [
    { "type": "Variable", "declarations": [ { "name": { "name": "interface" } } ] }
  ]
}"#;

// ────────────────────────────────────────────────────────────────────────────
// lower
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_lower_prints_ir() {
    let dir = tempfile::tempdir().unwrap();
    let ast = fixtures_dir().join("add.json");
    let output = jscfg(dir.path(), &["lower", ast.to_str().unwrap()]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.starts_with("; module "));
    assert!(text.contains("add.js"));
    assert!(text.contains("add(a, b)"));
    assert!(text.contains("ARG(0,0) + ARG(1,0)"));
    assert!(text.contains("global::add"));
}

#[test]
fn test_lower_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let ast = fixtures_dir().join("add.json");
    let out = dir.path().join("add.ir");
    let output = jscfg(
        dir.path(),
        &["lower", ast.to_str().unwrap(), "--output", out.to_str().unwrap()],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).is_empty());
    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.contains("ARG(0,0) + ARG(1,0)"));
}

#[test]
fn test_lower_renders_diagnostic_against_source() {
    let dir = tempfile::tempdir().unwrap();
    let ast = fixtures_dir().join("broken.json");
    let output = jscfg(dir.path(), &["lower", ast.to_str().unwrap()]);

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("E1007"), "stderr: {}", err);
    assert!(err.contains("Break outside of loop"));
    assert!(err.contains("broken.js"));
    assert!(err.contains("break;"));
}

#[test]
fn test_lower_without_source_prints_host_location() {
    let dir = tempfile::tempdir().unwrap();
    let ast = copy_fixture("broken.json", dir.path());
    let output = jscfg(dir.path(), &["lower", ast.to_str().unwrap()]);

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("error: file://"), "stderr: {}", err);
    assert!(err.contains("broken.json:2:1: Break outside of loop"));
}

#[test]
fn test_lower_rejects_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    let ast = dir.path().join("bad.json");
    std::fs::write(&ast, r#"{ "body": [ { "type": "Nonsense" } ] }"#).unwrap();
    let output = jscfg(dir.path(), &["lower", ast.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("is not a valid syntax tree"));
}

#[test]
fn test_unknown_mode_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let ast = fixtures_dir().join("add.json");
    let output = jscfg(dir.path(), &["lower", ast.to_str().unwrap(), "--mode", "module"]);
    assert!(!output.status.success());
}

// ────────────────────────────────────────────────────────────────────────────
// check
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_check_clean_directory() {
    let dir = tempfile::tempdir().unwrap();
    copy_fixture("add.json", dir.path());
    copy_fixture("add.js", dir.path());
    let output = jscfg(dir.path(), &["check"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("checked 1 file(s)"));
}

#[test]
fn test_check_json_report() {
    let dir = tempfile::tempdir().unwrap();
    copy_fixture("add.json", dir.path());
    copy_fixture("broken.json", dir.path());
    copy_fixture("broken.js", dir.path());
    let output = jscfg(dir.path(), &["check", "--format", "json"]);

    assert!(!output.status.success());
    let reports: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 2);

    assert_eq!(reports[0]["ok"], true);
    assert_eq!(reports[1]["ok"], false);
    let diag = &reports[1]["diagnostics"][0];
    assert_eq!(diag["code"], "E1007");
    assert_eq!(diag["labels"][0]["start_line"], 2);
}

#[test]
fn test_config_file_enables_strict_mode() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("decl.json"), STRICT_ONLY_ERROR).unwrap();

    let output = jscfg(dir.path(), &["check"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    std::fs::write(dir.path().join("jscfg.toml"), "[compile]\nstrict = true\n").unwrap();
    let output = jscfg(dir.path(), &["check"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("decl.json"));
}

#[test]
fn test_strict_flag_overrides_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("decl.json"), STRICT_ONLY_ERROR).unwrap();
    std::fs::write(dir.path().join("jscfg.toml"), "[compile]\nstrict = false\n").unwrap();

    let output = jscfg(dir.path(), &["check", "--strict"]);
    assert!(!output.status.success());
}

#[test]
fn test_missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = jscfg(dir.path(), &["--config", "nope.toml", "check"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to read config file"));
}
