//! Metrics sink boundary.
//!
//! Batching logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
//!
//! This module is the only allowed bridge between batching logic
//! and the global metrics state.
use crate::obs::metrics;
use std::cell::RefCell;

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn MetricsSink>> = RefCell::new(None);
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    BatcherBuilt {
        batches: u64,
        batch_size: u64,
        counted: bool,
    },
    CountIssued {
        failed: bool,
    },
    BatchPlanned {
        skip: u64,
        limit: u64,
    },
    BatchExecuted {
        rows: u64,
    },
    BatchFailed,
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default process-local sink that writes into global metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        metrics::with_state_mut(|m| match event {
            MetricsEvent::BatcherBuilt { .. } => {
                m.batchers_built = m.batchers_built.saturating_add(1);
            }

            MetricsEvent::CountIssued { failed } => {
                m.count_calls = m.count_calls.saturating_add(1);
                if failed {
                    m.count_failures = m.count_failures.saturating_add(1);
                }
            }

            MetricsEvent::BatchPlanned { limit, .. } => {
                m.batches_planned = m.batches_planned.saturating_add(1);
                m.rows_planned = m.rows_planned.saturating_add(limit);
                metrics::track_max(&mut m.max_batch_limit, limit);
            }

            MetricsEvent::BatchExecuted { rows } => {
                m.batches_executed = m.batches_executed.saturating_add(1);
                m.rows_loaded = m.rows_loaded.saturating_add(rows);
            }

            MetricsEvent::BatchFailed => {
                m.batches_failed = m.batches_failed.saturating_add(1);
            }
        });
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let override_ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = override_ptr {
        // SAFETY:
        // - `ptr` was produced from a valid `&dyn MetricsSink` in `with_metrics_sink`.
        // - `with_metrics_sink` restores the previous pointer before returning,
        //   including unwind paths via `Guard::drop`.
        // - `record` is synchronous and never stores `ptr` beyond this call.
        // - Only a shared reference is materialized, matching the borrow used
        //   to install the override.
        unsafe { (&*ptr).record(event) };
    } else {
        GLOBAL_METRICS_SINK.record(event);
    }
}

/// Snapshot the current metrics state for reporting and tests.
#[must_use]
pub fn metrics_report() -> metrics::BatchCounters {
    metrics::report()
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
///
/// Events recorded on this thread while `f` runs go to `sink` instead of the
/// global counters.
pub fn with_metrics_sink<T>(sink: &dyn MetricsSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<*const dyn MetricsSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY:
    // - `sink_ptr` is installed only for this dynamic scope.
    // - `Guard` restores the previous slot on all exits, including panic.
    // - `record` only dereferences synchronously and never persists `sink_ptr`.
    let sink_ptr = unsafe { std::mem::transmute::<&dyn MetricsSink, *const dyn MetricsSink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| {
        let mut slot = cell.borrow_mut();
        slot.replace(sink_ptr)
    });
    let _guard = Guard(prev);

    f()
}
