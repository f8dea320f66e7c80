use super::registry::UsageField;
use std::collections::HashMap;

/// Suffix perf appends to an event it could only count in user mode.
pub const RESTRICTED_SUFFIX: &str = ":u";

/// Name under which perf reports `event` when only user-mode counting is allowed.
pub fn restricted_event_name(event: &str) -> String {
    format!("{event}{RESTRICTED_SUFFIX}")
}

/// Raw counter values from one profiler run, keyed by the event name perf reported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCounterSet {
    counters: HashMap<String, f64>,
}

impl RawCounterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a counter value. A repeated event overwrites the earlier value.
    pub fn insert(&mut self, event: impl Into<String>, value: f64) {
        self.counters.insert(event.into(), value);
    }

    pub fn get(&self, event: &str) -> Option<f64> {
        self.counters.get(event).copied()
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for RawCounterSet {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (event, value) in iter {
            set.insert(event, value);
        }
        set
    }
}

/// Resource usage of terminated child processes, as reported by the OS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceUsageSnapshot {
    /// Peak resident set size in KiB
    pub max_rss_kib: i64,
}

impl ResourceUsageSnapshot {
    pub fn field(&self, field: UsageField) -> f64 {
        match field {
            UsageField::MaxRss => self.max_rss_kib as f64,
        }
    }
}

/// A finished, scaled measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub metric: &'static str,
    pub value: f64,
    pub unit: Option<&'static str>,
}
