use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Minimal valid config; schedule/engine sections fall back to defaults so
// the binary resolves whichever shift the test happens to run in.
fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[pacing]
target_seconds_per_part = 30
parts_per_cycle = 1

[data]
local_log = "cycles.jsonl"
shift_log = "shifts.csv"
"#;
    let path = dir.path().join("takt.toml");
    fs::write(&path, toml).unwrap();
    path
}

#[rstest]
#[case(&["--help"], "Usage:")]
#[case(&["self-check"], "config ok")]
#[case(&["self-check"], "shift:")]
#[case(&["history"], "no shift history")]
fn succeeding_cases_print_expected_output(#[case] args: &[&str], #[case] needle: &str) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("takt").unwrap();
    cmd.current_dir(dir.path());
    if !args.contains(&"--help") {
        cmd.arg("--config").arg(&cfg);
    }
    cmd.args(args);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(needle));
}

#[test]
fn malformed_config_fails_with_context() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("takt.toml");
    fs::write(
        &path,
        "[pacing]\ntarget_seconds_per_part = 30\nparts_per_cycle = 0\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("takt").unwrap();
    cmd.arg("--config").arg(&path).arg("self-check");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("parts_per_cycle"));
}

#[test]
fn missing_config_fails_with_the_path_in_the_message() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nope.toml");

    let mut cmd = Command::cargo_bin("takt").unwrap();
    cmd.arg("--config").arg(&path).arg("self-check");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("nope.toml"));
}

#[test]
fn init_seeds_a_loadable_default_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("takt.toml");

    Command::cargo_bin("takt")
        .unwrap()
        .arg("--config")
        .arg(&path)
        .arg("init")
        .assert()
        .success();

    Command::cargo_bin("takt")
        .unwrap()
        .arg("--config")
        .arg(&path)
        .arg("self-check")
        .assert()
        .success()
        .stdout(predicate::str::contains("config ok"));
}

// With stdin closed the reader thread exits immediately; --ticks bounds the
// loop so the run terminates on its own.
#[test]
fn bounded_run_emits_json_snapshots() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("takt").unwrap();
    cmd.current_dir(dir.path())
        .arg("--config")
        .arg(&cfg)
        .args(["run", "--snapshots", "--ticks", "3"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"shift\""))
        .stdout(predicate::str::contains("\"countdown\""));
}
