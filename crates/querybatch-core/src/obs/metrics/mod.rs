use serde::{Deserialize, Serialize};
use std::cell::RefCell;

///
/// BatchCounters
/// Ephemeral, in-memory counters for batch planning and execution.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct BatchCounters {
    // Construction
    pub batchers_built: u64,
    pub count_calls: u64,
    pub count_failures: u64,

    // Planning
    pub batches_planned: u64,
    pub rows_planned: u64,
    pub max_batch_limit: u64,

    // Execution
    pub batches_executed: u64,
    pub batches_failed: u64,
    pub rows_loaded: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<BatchCounters> = RefCell::new(BatchCounters::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&BatchCounters) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut BatchCounters) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters (useful in tests).
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = BatchCounters::default());
}

/// Snapshot the current counters.
pub(crate) fn report() -> BatchCounters {
    with_state(Clone::clone)
}

/// Track a running maximum.
pub(crate) const fn track_max(max: &mut u64, value: u64) {
    if value > *max {
        *max = value;
    }
}
