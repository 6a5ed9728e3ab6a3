//! Observability: runtime counters and the sink boundary that feeds them.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventReport, EventState, TableSummary};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all};
