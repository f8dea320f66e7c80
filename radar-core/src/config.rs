use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration for a measurement run.
///
/// Every field has a default, so an empty file (or no file at all) yields
/// the behaviour downstream pipelines expect: `perf` under the `C` locale,
/// lines prefixed with `radar::measurement`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RadarConfig {
    #[serde(default)]
    pub profiler: ProfilerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// How the external profiler is launched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilerConfig {
    /// Program name or path of the profiler
    #[serde(default = "default_program")]
    pub program: String,
    /// Value of `LC_ALL` in the profiler's environment.
    /// Anything but a dot-decimal locale can make perf emit invalid JSON.
    #[serde(default = "default_locale")]
    pub locale: String,
}

/// Shape of the emitted measurement lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Text before the `=` on every measurement line
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_program() -> String {
    "perf".to_string()
}

fn default_locale() -> String {
    "C".to_string()
}

fn default_prefix() -> String {
    "radar::measurement".to_string()
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            locale: default_locale(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

impl RadarConfig {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&contents)?)
    }

    pub fn new() -> Self {
        Self::default()
    }

    /// Set the profiler program (name on `PATH` or a path).
    pub fn with_profiler_program(mut self, program: impl Into<String>) -> Self {
        self.profiler.program = program.into();
        self
    }

    /// Set the locale forced onto the profiler's environment.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.profiler.locale = locale.into();
        self
    }

    /// Set the measurement line prefix.
    pub fn with_line_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.output.prefix = prefix.into();
        self
    }
}
