use crate::error::Result;
use crate::metrics::types::{RawCounterSet, ResourceUsageSnapshot};

/// Runs a command under a counting profiler.
pub trait CounterCollector {
    /// Run `command` to completion with the given `events` counted.
    ///
    /// A non-zero exit is returned as [`MeasureError::ChildFailed`] carrying the
    /// exact status.
    ///
    /// [`MeasureError::ChildFailed`]: crate::MeasureError::ChildFailed
    fn collect(&self, command: &[String], events: &[&str]) -> Result<RawCounterSet>;
}

/// Reads cumulative resource usage of terminated children.
///
/// Must only be called after every child of interest has been waited for;
/// earlier reads are incomplete.
pub trait UsageCollector {
    fn snapshot(&self) -> Result<ResourceUsageSnapshot>;
}
