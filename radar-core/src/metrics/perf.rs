//! `perf stat` driver.
//!
//! The command is wrapped as `perf stat -j -o <tmpfile> -e <event>... -- <command>`.
//! With `-j` perf writes one JSON object per line, for example
//!
//! ```text
//! {"counter-value" : "2000000000.000000", "unit" : "msec", "event" : "task-clock", ...}
//! {"counter-value" : "123456.000000", "unit" : "", "event" : "instructions:u", ...}
//! ```
//!
//! Records without both `event` and `counter-value` (summary and metric-only
//! lines) are skipped.

use crate::config::ProfilerConfig;
use crate::error::{MeasureError, Result};
use crate::metrics::collector::CounterCollector;
use crate::metrics::types::RawCounterSet;
use serde_json::{Map, Value};
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::{Command, ExitStatus};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Collects counters by running the command under `perf stat`.
#[derive(Debug, Clone)]
pub struct PerfCollector {
    program: String,
    locale: String,
}

impl PerfCollector {
    pub fn new(config: &ProfilerConfig) -> Self {
        Self {
            program: config.program.clone(),
            locale: config.locale.clone(),
        }
    }

    /// Arguments passed to the profiler, the wrapped command last and untouched.
    fn stat_args(&self, output: &Path, events: &[&str], command: &[String]) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "stat".into(),
            "-j".into(),
            "-o".into(),
            output.as_os_str().to_owned(),
        ];
        for event in events {
            args.push("-e".into());
            args.push((*event).into());
        }
        args.push("--".into());
        args.extend(command.iter().map(OsString::from));
        args
    }
}

impl Default for PerfCollector {
    fn default() -> Self {
        Self::new(&ProfilerConfig::default())
    }
}

impl CounterCollector for PerfCollector {
    fn collect(&self, command: &[String], events: &[&str]) -> Result<RawCounterSet> {
        if command.is_empty() {
            return Err(MeasureError::EmptyCommand);
        }

        // Deleted when dropped, on every return path below.
        let output = NamedTempFile::new()?;
        let args = self.stat_args(output.path(), events, command);
        debug!(program = %self.program, ?args, "launching profiler");

        let status = Command::new(&self.program)
            .args(&args)
            .env("LC_ALL", &self.locale)
            .status()
            .map_err(|source| MeasureError::ProfilerLaunch {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            let code = exit_code(status);
            debug!(code, "profiled command failed");
            return Err(MeasureError::ChildFailed { code });
        }

        let counters = parse_stat_output(BufReader::new(File::open(output.path())?))?;
        debug!(count = counters.len(), "parsed profiler counters");
        Ok(counters)
    }
}

/// Exit status to propagate. Signal deaths map to `128 + signo`, like a shell.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    let signo = status.signal().unwrap_or(0);
    match nix::sys::signal::Signal::try_from(signo) {
        Ok(signal) => warn!(%signal, "profiled command killed by signal"),
        Err(_) => warn!(signo, "profiled command terminated abnormally"),
    }
    128 + signo
}

/// Parse perf's line-delimited JSON output.
///
/// Blank lines are ignored. A line that is not a JSON object, or whose
/// `counter-value` is not a finite number, fails the whole parse.
pub fn parse_stat_output<R: BufRead>(reader: R) -> Result<RawCounterSet> {
    let mut counters = RawCounterSet::new();
    let mut skipped = 0usize;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let record: Map<String, Value> =
            serde_json::from_str(&line).map_err(|e| MeasureError::MalformedOutput {
                line: line_no,
                reason: e.to_string(),
            })?;

        let (Some(event), Some(value)) = (record.get("event"), record.get("counter-value")) else {
            skipped += 1;
            continue;
        };

        let event = event.as_str().ok_or_else(|| MeasureError::MalformedOutput {
            line: line_no,
            reason: format!("event is not a string: {event}"),
        })?;
        let value = counter_value(value).ok_or_else(|| MeasureError::MalformedOutput {
            line: line_no,
            reason: format!("counter-value of `{event}` is not a number: {value}"),
        })?;

        counters.insert(event, value);
    }

    if skipped > 0 {
        debug!(skipped, "ignored auxiliary profiler records");
    }
    Ok(counters)
}

/// perf writes counter values as strings; plain numbers are accepted too.
/// `nan` and `inf` are rejected, they have no JSON number form downstream.
fn counter_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}
