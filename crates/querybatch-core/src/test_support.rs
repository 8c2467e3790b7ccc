use crate::{
    db::query::{Execute, OrderSpec, Query},
    error::StoreError,
};
use std::{cell::Cell, rc::Rc};

///
/// RecordingQuery
///
/// Test-only query over `total` positional records.
/// Remembers every ordering/limit/skip applied to it and counts `count()`
/// round trips across all clones.
///

#[derive(Clone, Debug, Default)]
pub(crate) struct RecordingQuery {
    pub(crate) total: u64,
    pub(crate) preordered: bool,
    pub(crate) order: Option<OrderSpec>,
    pub(crate) order_calls: u32,
    pub(crate) limit: Option<u64>,
    pub(crate) skip: Option<u64>,
    count_calls: Rc<Cell<u32>>,
    count_failure: Option<StoreError>,
    execute_failures: Rc<Cell<u32>>,
}

impl RecordingQuery {
    pub(crate) fn with_total(total: u64) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Source that already carries an ordering of its own.
    pub(crate) fn preordered(mut self) -> Self {
        self.preordered = true;
        self
    }

    pub(crate) fn failing_count(mut self, err: StoreError) -> Self {
        self.count_failure = Some(err);
        self
    }

    /// Fail the next `n` executions made through any clone.
    pub(crate) fn fail_next_executions(&self, n: u32) {
        self.execute_failures.set(n);
    }

    pub(crate) fn count_calls(&self) -> u32 {
        self.count_calls.get()
    }

    pub(crate) fn window(&self) -> (u64, u64) {
        (self.skip.unwrap_or(0), self.limit.unwrap_or(u64::MAX))
    }
}

impl Query for RecordingQuery {
    fn count(&self) -> Result<u64, StoreError> {
        self.count_calls.set(self.count_calls.get() + 1);

        match &self.count_failure {
            Some(err) => Err(err.clone()),
            None => Ok(self.total),
        }
    }

    fn order_by(&self, order: &OrderSpec) -> Self {
        let mut next = self.clone();
        next.order = Some(order.clone());
        next.order_calls += 1;
        next
    }

    fn limit(&self, limit: u64) -> Self {
        let mut next = self.clone();
        next.limit = Some(limit);
        next
    }

    fn skip(&self, skip: u64) -> Self {
        let mut next = self.clone();
        next.skip = Some(skip);
        next
    }

    fn has_explicit_ordering(&self) -> bool {
        self.preordered || self.order.is_some()
    }
}

impl Execute for RecordingQuery {
    type Record = u64;

    fn execute(&self) -> Result<Vec<u64>, StoreError> {
        let pending = self.execute_failures.get();
        if pending > 0 {
            self.execute_failures.set(pending - 1);
            return Err(StoreError::timeout("batch execution timed out"));
        }

        let (skip, limit) = self.window();
        let end = skip.saturating_add(limit).min(self.total);

        Ok((skip.min(end)..end).collect())
    }
}
