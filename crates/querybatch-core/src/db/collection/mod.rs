//! Collection-level batch execution.
//!
//! Wraps the batcher so each pulled batch is executed against the store
//! and handed back as materialized records.


use crate::{
    db::{
        batch::{BatchOptions, BatchWindow, Batches, in_batches},
        query::Execute,
    },
    error::BatchError,
    obs::sink::{self, MetricsEvent},
};
use std::iter::FusedIterator;
use tracing::{debug, warn};

/// Records produced by one executed batch of `Q`.
pub type BatchRecords<Q> = Vec<<Q as Execute>::Record>;

///
/// Collection
///
/// A store collection that can hand out its root query.
/// Provides batched iteration over every record the root query matches.
///

pub trait Collection {
    type Query: Execute;

    /// Root query over the whole collection.
    fn query(&self) -> Self::Query;

    /// Lazy sequence of executed batches; each pull is one store round trip.
    fn find_in_batches(
        &self,
        options: BatchOptions,
    ) -> Result<ExecutedBatches<Self::Query>, BatchError> {
        in_batches(self.query(), options).map(ExecutedBatches::new)
    }

    /// Execute every batch and pass its records to `f`.
    /// Stops at the first store failure.
    fn find_in_batches_with<F>(&self, options: BatchOptions, f: F) -> Result<(), BatchError>
    where
        F: FnMut(BatchRecords<Self::Query>),
    {
        self.find_in_batches(options)?.for_each_batch(f)
    }
}

///
/// ExecutedBatches
///
/// Lazy sequence of executed batches.
/// A failed batch is yielded as an error; later batches can still be pulled
/// since every sub-query is derived from fixed arithmetic.
///

#[derive(Clone, Debug)]
pub struct ExecutedBatches<Q> {
    batches: Batches<Q>,
}

impl<Q: Execute> ExecutedBatches<Q> {
    #[must_use]
    pub const fn new(batches: Batches<Q>) -> Self {
        Self { batches }
    }

    /// Call `f` with the records of each batch, stopping at the first failure.
    pub fn for_each_batch<F>(self, mut f: F) -> Result<(), BatchError>
    where
        F: FnMut(BatchRecords<Q>),
    {
        for records in self {
            f(records?);
        }

        Ok(())
    }

    /// Like [`Self::for_each_batch`], but `f` may stop iteration with its own error.
    pub fn try_for_each_batch<F, E>(self, mut f: F) -> Result<(), E>
    where
        F: FnMut(BatchRecords<Q>) -> Result<(), E>,
        E: From<BatchError>,
    {
        for records in self {
            f(records?)?;
        }

        Ok(())
    }

    /// Unexecuted sub-queries still to come.
    #[must_use]
    pub const fn batches(&self) -> &Batches<Q> {
        &self.batches
    }
}

impl<Q: Execute> Iterator for ExecutedBatches<Q> {
    type Item = Result<BatchRecords<Q>, BatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (window, query) = self.batches.next_with_window()?;

        Some(execute_batch(window, &query))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.batches.size_hint()
    }
}

impl<Q: Execute> ExactSizeIterator for ExecutedBatches<Q> {}

impl<Q: Execute> FusedIterator for ExecutedBatches<Q> {}

fn execute_batch<Q: Execute>(
    window: BatchWindow,
    query: &Q,
) -> Result<BatchRecords<Q>, BatchError> {
    match query.execute() {
        Ok(records) => {
            let rows = u64::try_from(records.len()).unwrap_or(u64::MAX);

            debug!(skip = window.skip, limit = window.limit, rows, "batch executed");
            sink::record(MetricsEvent::BatchExecuted { rows });

            Ok(records)
        }
        Err(err) => {
            warn!(
                skip = window.skip,
                limit = window.limit,
                error = %err.display_with_class(),
                "batch execution failed"
            );
            sink::record(MetricsEvent::BatchFailed);

            Err(err.into())
        }
    }
}
