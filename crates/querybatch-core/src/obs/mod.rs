//! Observability: batch telemetry (metrics) and sink abstractions.
//!
//! Log output goes through `tracing`; counters go through the sink below.

pub(crate) mod metrics;
pub(crate) mod sink;


// re-exports
pub use metrics::BatchCounters;
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink};
