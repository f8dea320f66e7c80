use crate::error::Result;
use crate::metrics::collector::UsageCollector;
use crate::metrics::types::ResourceUsageSnapshot;
use nix::sys::resource::{getrusage, UsageWho};

/// `getrusage(RUSAGE_CHILDREN)`: totals over every terminated, waited-for
/// descendant of this process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChildrenUsage;

impl UsageCollector for ChildrenUsage {
    fn snapshot(&self) -> Result<ResourceUsageSnapshot> {
        let usage = getrusage(UsageWho::RUSAGE_CHILDREN)?;
        Ok(ResourceUsageSnapshot {
            max_rss_kib: i64::from(usage.max_rss()),
        })
    }
}
