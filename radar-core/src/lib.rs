//! radar-core - Benchmark measurement collection
//!
//! Runs a command under `perf stat` and reads `getrusage(RUSAGE_CHILDREN)`
//! afterwards, then turns the raw numbers into named, scaled measurements:
//! - Metric registry (`task-clock`, `wall-clock`, `instructions`, `maxrss`)
//! - Profiler and resource usage collectors
//! - Measurement aggregation with unit conversion
//! - Line-oriented reporting for benchmark pipelines
//!
//! ## Primary API
//!
//! ```no_run
//! use radar_core::{MeasurementAggregator, RadarConfig, Reporter};
//!
//! let config = RadarConfig::default();
//! let command = vec!["sleep".to_string(), "1".to_string()];
//! let measurements = MeasurementAggregator::from_config(&config)
//!     .measure(&command, &["wall-clock", "maxrss"])?;
//!
//! let topics = vec!["sleep".to_string()];
//! Reporter::from_config(&config.output).report(&mut std::io::stdout(), &topics, &measurements)?;
//! # Ok::<(), radar_core::MeasureError>(())
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod report;

pub use config::{ConfigError, OutputConfig, ProfilerConfig, RadarConfig};
pub use error::{MeasureError, Result};
pub use metrics::{
    ChildrenUsage, CounterCollector, Measurement, MeasurementAggregator, MetricRegistry,
    MetricSource, MetricSpec, PerfCollector, UsageCollector,
};
pub use report::Reporter;
