use crate::config::RadarConfig;
use crate::error::{MeasureError, Result};
use crate::metrics::collector::{CounterCollector, UsageCollector};
use crate::metrics::perf::PerfCollector;
use crate::metrics::registry::{MetricRegistry, MetricSource, MetricSpec};
use crate::metrics::rusage::ChildrenUsage;
use crate::metrics::types::{
    restricted_event_name, Measurement, RawCounterSet, ResourceUsageSnapshot,
};
use tracing::{debug, info};

/// Turns a list of metric names into finished measurements of one command run.
pub struct MeasurementAggregator<C, U> {
    registry: &'static MetricRegistry,
    counters: C,
    usage: U,
}

impl MeasurementAggregator<PerfCollector, ChildrenUsage> {
    /// `perf stat` plus `getrusage`, set up from `config`.
    pub fn from_config(config: &RadarConfig) -> Self {
        Self::new(PerfCollector::new(&config.profiler), ChildrenUsage)
    }
}

impl<C: CounterCollector, U: UsageCollector> MeasurementAggregator<C, U> {
    pub fn new(counters: C, usage: U) -> Self {
        Self {
            registry: MetricRegistry::builtin(),
            counters,
            usage,
        }
    }

    /// Run `command` once and return one measurement per requested metric.
    ///
    /// Results follow the order of `metrics`, duplicates included. Unknown
    /// metric names are all reported together, before anything is spawned.
    pub fn measure<S: AsRef<str>>(
        &self,
        command: &[String],
        metrics: &[S],
    ) -> Result<Vec<Measurement>> {
        let specs = self.resolve(metrics)?;
        if command.is_empty() {
            return Err(MeasureError::EmptyCommand);
        }

        let events = profiler_events(&specs);
        info!(?events, command = ?command, "measuring");

        let counters = self.counters.collect(command, &events)?;
        let usage = self.usage.snapshot()?;

        specs
            .iter()
            .map(|spec| reconcile(spec, &counters, &usage))
            .collect()
    }

    fn resolve<S: AsRef<str>>(&self, metrics: &[S]) -> Result<Vec<&'static MetricSpec>> {
        let mut specs = Vec::with_capacity(metrics.len());
        let mut unknown = Vec::new();

        for name in metrics {
            let name = name.as_ref();
            match self.registry.get(name) {
                Some(spec) => specs.push(spec),
                None => unknown.push(name.to_string()),
            }
        }

        if !unknown.is_empty() {
            return Err(MeasureError::UnknownMetrics(unknown));
        }
        Ok(specs)
    }
}

/// Profiler events needed by `specs`, each once, in first-request order.
fn profiler_events(specs: &[&MetricSpec]) -> Vec<&'static str> {
    let mut events: Vec<&'static str> = Vec::new();
    for event in specs.iter().filter_map(|spec| spec.event()) {
        if !events.contains(&event) {
            events.push(event);
        }
    }
    events
}

fn reconcile(
    spec: &MetricSpec,
    counters: &RawCounterSet,
    usage: &ResourceUsageSnapshot,
) -> Result<Measurement> {
    let raw = match spec.source {
        MetricSource::ProfilerEvent(event) => counter(spec.name, event, counters)?,
        MetricSource::ResourceField(field) => usage.field(field),
    };

    Ok(Measurement {
        metric: spec.name,
        value: raw * spec.scale,
        unit: spec.unit,
    })
}

/// Look up `event`, then its user-mode-only variant.
///
/// Without perf_event permissions perf only counts in user space and reports
/// the event as `<event>:u`.
fn counter(metric: &str, event: &str, counters: &RawCounterSet) -> Result<f64> {
    if let Some(value) = counters.get(event) {
        return Ok(value);
    }

    let restricted = restricted_event_name(event);
    if let Some(value) = counters.get(&restricted) {
        debug!(metric, event = %restricted, "using user-mode counter");
        return Ok(value);
    }

    Err(MeasureError::MissingCounter {
        metric: metric.to_string(),
        event: event.to_string(),
        restricted,
    })
}
