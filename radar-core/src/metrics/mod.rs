mod aggregator;
mod collector;
mod perf;
mod registry;
mod rusage;
mod types;

pub use aggregator::MeasurementAggregator;
pub use collector::{CounterCollector, UsageCollector};
pub use perf::{parse_stat_output, PerfCollector};
pub use registry::{MetricRegistry, MetricSource, MetricSpec, UsageField};
pub use rusage::ChildrenUsage;
pub use types::{
    restricted_event_name, Measurement, RawCounterSet, ResourceUsageSnapshot, RESTRICTED_SUFFIX,
};
