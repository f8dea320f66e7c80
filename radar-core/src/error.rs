//! Error types for a measurement run.
//!
//! Every failure aborts the run. Nothing is retried here; re-running is up to the
//! surrounding automation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeasureError {
    /// One or more requested metric names are not in the registry.
    #[error("unknown metrics: {}", .0.join(", "))]
    UnknownMetrics(Vec<String>),

    #[error("no command given to measure")]
    EmptyCommand,

    #[error("failed to launch profiler `{program}`: {source}")]
    ProfilerLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The profiled command (or the profiler itself) exited unsuccessfully.
    /// `code` is the status to hand back to the caller unchanged.
    #[error("measured command exited with status {code}")]
    ChildFailed { code: i32 },

    #[error("malformed profiler output on line {line}: {reason}")]
    MalformedOutput { line: usize, reason: String },

    #[error("profiler reported no counter for metric `{metric}` (looked up `{event}` and `{restricted}`)")]
    MissingCounter {
        metric: String,
        event: String,
        restricted: String,
    },

    #[error("failed to read resource usage of child processes: {0}")]
    ResourceUsage(#[from] nix::errno::Errno),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MeasureError {
    /// Exit status that should be propagated verbatim, if this error carries one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            MeasureError::ChildFailed { code } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MeasureError>;
