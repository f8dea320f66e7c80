//! Measurement line output.
//!
//! Each line reads `<prefix>=<json>`, e.g.
//! `radar::measurement={"metric":"build//task-clock","value":2.0,"unit":"s"}`.

use crate::config::OutputConfig;
use crate::error::Result;
use crate::metrics::Measurement;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct MeasurementLine<'a> {
    metric: String,
    value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<&'a str>,
}

/// Writes one line per (topic, measurement) pair.
#[derive(Debug, Clone)]
pub struct Reporter {
    prefix: String,
}

impl Reporter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.prefix.clone())
    }

    /// Format a single measurement under `topic`, without trailing newline.
    pub fn format_line(&self, topic: &str, measurement: &Measurement) -> Result<String> {
        let line = MeasurementLine {
            metric: format!("{topic}//{}", measurement.metric),
            value: measurement.value,
            unit: measurement.unit,
        };
        Ok(format!("{}={}", self.prefix, serde_json::to_string(&line)?))
    }

    /// Write every measurement for every topic, topic-major.
    pub fn report<W: Write>(
        &self,
        out: &mut W,
        topics: &[String],
        measurements: &[Measurement],
    ) -> Result<()> {
        for topic in topics {
            for measurement in measurements {
                writeln!(out, "{}", self.format_line(topic, measurement)?)?;
            }
        }
        out.flush()?;
        Ok(())
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::from_config(&OutputConfig::default())
    }
}
