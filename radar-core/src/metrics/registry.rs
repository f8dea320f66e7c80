//! The fixed table of metrics a caller can ask for.
//!
//! Each metric comes from exactly one place: a profiler counter event or a
//! field of the children's resource usage. The table is built at compile time
//! and never changes.

/// Resource usage fields a metric can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageField {
    /// `ru_maxrss`, peak resident set size in KiB
    MaxRss,
}

impl UsageField {
    /// Name of the field in `struct rusage`.
    pub fn name(self) -> &'static str {
        match self {
            UsageField::MaxRss => "ru_maxrss",
        }
    }
}

/// Where a metric's raw value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricSource {
    /// A perf event, by the name perf reports it under
    ProfilerEvent(&'static str),
    ResourceField(UsageField),
}

/// A user-facing metric and how to obtain it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSpec {
    pub name: &'static str,
    pub source: MetricSource,
    /// Multiplier applied to the raw value
    pub scale: f64,
    pub unit: Option<&'static str>,
}

impl MetricSpec {
    const fn profiler(name: &'static str, event: &'static str) -> Self {
        Self {
            name,
            source: MetricSource::ProfilerEvent(event),
            scale: 1.0,
            unit: None,
        }
    }

    const fn usage(name: &'static str, field: UsageField) -> Self {
        Self {
            name,
            source: MetricSource::ResourceField(field),
            scale: 1.0,
            unit: None,
        }
    }

    const fn scaled(mut self, scale: f64, unit: &'static str) -> Self {
        self.scale = scale;
        self.unit = Some(unit);
        self
    }

    /// The perf event this metric needs, if it is profiler-sourced.
    pub fn event(&self) -> Option<&'static str> {
        match self.source {
            MetricSource::ProfilerEvent(event) => Some(event),
            MetricSource::ResourceField(_) => None,
        }
    }
}

/// Lookup table from metric name to [`MetricSpec`].
#[derive(Debug)]
pub struct MetricRegistry {
    specs: &'static [MetricSpec],
}

static BUILTIN: MetricRegistry = MetricRegistry {
    specs: &[
        MetricSpec::profiler("task-clock", "task-clock").scaled(1e-9, "s"),
        MetricSpec::profiler("wall-clock", "duration_time").scaled(1e-9, "s"),
        MetricSpec::profiler("instructions", "instructions"),
        // KiB on Linux
        MetricSpec::usage("maxrss", UsageField::MaxRss).scaled(1000.0, "b"),
    ],
};

impl MetricRegistry {
    /// The metrics understood by the measurement tool.
    pub fn builtin() -> &'static MetricRegistry {
        &BUILTIN
    }

    /// Get a metric by name.
    pub fn get(&self, name: &str) -> Option<&'static MetricSpec> {
        self.specs.iter().find(|spec| spec.name == name)
    }

    /// All registered metrics, in table order.
    pub fn all(&self) -> &'static [MetricSpec] {
        self.specs
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.specs.iter().map(|spec| spec.name)
    }
}
