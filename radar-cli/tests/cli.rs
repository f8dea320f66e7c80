//! End-to-end tests of the `radar-measure` binary against a stand-in profiler.

#![cfg(unix)]

use serde_json::Value;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::OnceLock;
use tempfile::tempdir;

/// Mimics `perf stat -j -o FILE [-e EVENT]... -- COMMAND...`. Instructions are
/// reported only in their user-mode form, as for an unprivileged user.
const FAKE_PERF: &str = r#"#!/bin/sh
out=""
events=""
while [ "$#" -gt 0 ]; do
    case "$1" in
        -o) out="$2"; shift 2 ;;
        -e) events="$events $2"; shift 2 ;;
        --) shift; break ;;
        *) shift ;;
    esac
done
[ "$LC_ALL" = "C" ] || exit 97
: > "$out"
for event in $events; do
    case " $FAKE_PERF_DROP " in *" $event "*) continue ;; esac
    case "$event" in
        task-clock) echo '{"counter-value" : "2000000000.000000", "unit" : "msec", "event" : "task-clock", "event-runtime" : 2000000000, "pcnt-running" : 100.00}' >> "$out" ;;
        instructions) echo '{"counter-value" : "51234.000000", "unit" : "", "event" : "instructions:u", "event-runtime" : 1800000, "pcnt-running" : 100.00}' >> "$out" ;;
        duration_time) echo '{"counter-value" : "3000000000", "unit" : "ns", "event" : "duration_time"}' >> "$out" ;;
    esac
    echo '{"metric-value" : "0.500000", "metric-unit" : "CPUs utilized"}' >> "$out"
done
[ -n "$FAKE_PERF_GARBAGE" ] && echo '{"counter-value" : 1,5}' >> "$out"
"$@"
"#;

fn fake_perf() -> &'static Path {
    static SCRIPT: OnceLock<PathBuf> = OnceLock::new();
    SCRIPT.get_or_init(|| {
        let path = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("radar-fake-perf.sh");
        fs::write(&path, FAKE_PERF).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    })
}

fn radar() -> Command {
    radar_with(fake_perf())
}

fn radar_with(profiler: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_radar-measure"));
    command
        .arg("--profiler")
        .arg(profiler)
        .env_remove("RUST_LOG")
        .env_remove("FAKE_PERF_DROP")
        .env_remove("FAKE_PERF_GARBAGE");
    command
}

fn measurements(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter_map(|line| line.strip_prefix("radar::measurement="))
        .map(|json| serde_json::from_str(json).unwrap())
        .collect()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn reports_every_topic_and_metric() {
    let output = radar()
        .args(["-t", "first", "-t", "second"])
        .args(["-m", "task-clock", "-m", "instructions", "-m", "wall-clock", "-m", "maxrss"])
        .args(["--", "true"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let lines = measurements(&output);
    let names: Vec<_> = lines.iter().map(|l| l["metric"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        [
            "first//task-clock",
            "first//instructions",
            "first//wall-clock",
            "first//maxrss",
            "second//task-clock",
            "second//instructions",
            "second//wall-clock",
            "second//maxrss",
        ]
    );

    assert_eq!(lines[0]["value"], 2.0);
    assert_eq!(lines[0]["unit"], "s");
    assert_eq!(lines[1]["value"], 51234.0);
    assert!(lines[1].get("unit").is_none());
    assert_eq!(lines[2]["value"], 3.0);
    assert_eq!(lines[2]["unit"], "s");
    assert!(lines[3]["value"].as_f64().unwrap() > 0.0);
    assert_eq!(lines[3]["unit"], "b");
}

#[test]
fn command_output_passes_through() {
    let output = radar()
        .args(["-t", "echo", "-m", "task-clock", "echo", "hello", "-m"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|line| line == "hello -m"));
    assert_eq!(measurements(&output).len(), 1);
}

#[test]
fn child_exit_status_is_propagated() {
    let output = radar()
        .args(["-t", "fail", "-m", "task-clock", "-m", "maxrss", "--", "sh", "-c", "exit 3"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(output.stdout.is_empty());
}

#[test]
fn unknown_metrics_fail_before_spawning() {
    let dir = tempdir().unwrap();
    let marker = dir.path().join("ran");

    let output = radar()
        .args(["-t", "t", "-m", "task-clock", "-m", "bogus-metric", "-m", "other-bogus"])
        .arg("--")
        .arg("touch")
        .arg(&marker)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(!marker.exists());

    let stderr = stderr(&output);
    assert!(stderr.contains("bogus-metric"), "stderr: {stderr}");
    assert!(stderr.contains("other-bogus"), "stderr: {stderr}");
}

#[test]
fn unknown_metrics_reported_without_command() {
    let output = radar()
        .args(["-t", "t", "-m", "bogus-metric", "-m", "maxrss"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    let stderr = stderr(&output);
    assert!(stderr.contains("unknown metrics: bogus-metric"), "stderr: {stderr}");
}

#[test]
fn empty_command_rejected_after_metrics_validate() {
    let output = radar()
        .args(["-t", "t", "-m", "task-clock", "-m", "maxrss"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    let stderr = stderr(&output);
    assert!(stderr.contains("no command given"), "stderr: {stderr}");
}

#[test]
fn missing_counter_is_fatal() {
    let output = radar()
        .env("FAKE_PERF_DROP", "instructions")
        .args(["-t", "t", "-m", "task-clock", "-m", "instructions", "--", "true"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(stderr(&output).contains("instructions:u"));
}

#[test]
fn malformed_profiler_output_is_fatal() {
    let output = radar()
        .env("FAKE_PERF_GARBAGE", "1")
        .args(["-t", "t", "-m", "task-clock", "--", "true"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("malformed profiler output"));
}

#[test]
fn locale_from_config_reaches_profiler() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("radar.yaml");
    fs::write(&config, "profiler:\n  locale: de_DE.UTF-8\n").unwrap();

    // The stand-in profiler refuses to run outside the C locale.
    let output = radar()
        .arg("--config")
        .arg(&config)
        .args(["-t", "t", "-m", "maxrss", "--", "true"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(97));
}

#[test]
fn line_prefix_from_config() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("radar.yaml");
    fs::write(&config, "output:\n  prefix: custom\n").unwrap();

    let output = radar()
        .arg("--config")
        .arg(&config)
        .args(["-t", "t", "-m", "maxrss", "--", "true"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("custom={\"metric\":\"t//maxrss\""));
}

#[test]
fn missing_profiler_fails() {
    let output = radar_with(Path::new("/nonexistent/perf"))
        .args(["-t", "t", "-m", "maxrss", "--", "true"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("failed to launch profiler"));
}
