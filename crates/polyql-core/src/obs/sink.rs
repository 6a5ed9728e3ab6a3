//! Metrics sink boundary.
//!
//! Executor code never touches `obs::metrics` directly. All instrumentation
//! flows through `MetricsEvent` and a `MetricsSink`: the handle's own sink
//! when one is installed, the global counters otherwise.

use crate::{compile::Dialect, error::ErrorClass, executor::Operation, obs::metrics};

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent<'a> {
    ExecStart {
        op: Operation,
        table: &'a str,
    },
    ExecFinish {
        op: Operation,
        table: &'a str,
        rows: u64,
    },
    Compile {
        dialect: Dialect,
    },
    CacheHit {
        name: &'a str,
    },
    CacheMiss {
        name: &'a str,
    },
    /// A concurrent caller stored the same name first.
    CacheRace {
        name: &'a str,
    },
    Error {
        op: Operation,
        table: &'a str,
        class: ErrorClass,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricsEvent<'_>);
}

/// GlobalMetricsSink
/// Default sink writing into the in-process counters.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent<'_>) {
        metrics::with_state_mut(|m| match event {
            MetricsEvent::ExecStart { op, table } => metrics::record_exec_start(m, op, table),
            MetricsEvent::ExecFinish { op, table, rows } => {
                metrics::record_exec_finish(m, op, table, rows);
            }
            MetricsEvent::Compile { .. } => m.ops.compiles = m.ops.compiles.saturating_add(1),
            MetricsEvent::CacheHit { .. } => {
                m.ops.cache_hits = m.ops.cache_hits.saturating_add(1);
            }
            MetricsEvent::CacheMiss { .. } => {
                m.ops.cache_misses = m.ops.cache_misses.saturating_add(1);
            }
            MetricsEvent::CacheRace { .. } => {
                m.ops.cache_races = m.ops.cache_races.saturating_add(1);
            }
            MetricsEvent::Error { table, class, .. } => metrics::record_error(m, table, class),
        });
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

/// Route `event` to `sink`, or to the global counters when none is given.
pub(crate) fn record(sink: Option<&dyn MetricsSink>, event: MetricsEvent<'_>) {
    match sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current counters.
///
/// `window_start_ms` filters by window start (`EventState::window_start_ms`),
/// not by per-event timestamps.
#[must_use]
pub fn metrics_report(window_start_ms: Option<u64>) -> metrics::EventReport {
    metrics::report_window_start(window_start_ms)
}

/// Reset all counters.
pub fn metrics_reset_all() {
    metrics::reset_all();
}
