//! Batch partitioning: splits one ordered query into bounded sub-queries
//! that cover `[offset, to)` exactly once.

mod partition;
#[cfg(test)]
mod tests;

use crate::{
    db::query::{OrderSpec, Query},
    error::{BatchError, ConfigError},
    obs::sink::{self, MetricsEvent},
};
use std::iter::FusedIterator;
use tracing::{debug, trace, warn};

pub use partition::{BatchWindow, Partition};

/// Records per sub-query when no batch size is configured.
pub const DEFAULT_BATCH_SIZE: u64 = 1_000;

///
/// BatchOptions
///
/// - `batch_size`: max records per sub-query (default 1000)
/// - `to`: exclusive end of the range; `None` counts the source query
/// - `offset`: inclusive start of the range (default 0)
/// - `order_by`: imposed only when the source query is unordered
///   (default ascending primary key)
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BatchOptions {
    pub batch_size: u64,
    pub to: Option<u64>,
    pub offset: u64,
    pub order_by: OrderSpec,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            to: None,
            offset: 0,
            order_by: OrderSpec::primary_key(),
        }
    }
}

impl BatchOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub const fn to(mut self, to: u64) -> Self {
        self.to = Some(to);
        self
    }

    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn order_by(mut self, order_by: OrderSpec) -> Self {
        self.order_by = order_by;
        self
    }
}

///
/// Batcher
///
/// Validated batching plan over one source query.
/// Holds no iteration state; every call to [`Batcher::batches`] starts a
/// fresh partition from `offset`.
///

#[derive(Clone, Debug)]
pub struct Batcher<Q> {
    query: Q,
    batch_size: u64,
    to: u64,
    offset: u64,
    order_by: OrderSpec,
}

impl<Q: Query> Batcher<Q> {
    /// Validate `options` against `query`.
    ///
    /// Counts the source query once when `to` is not set; never otherwise.
    pub fn new(query: Q, options: BatchOptions) -> Result<Self, BatchError> {
        let BatchOptions {
            batch_size,
            to,
            offset,
            order_by,
        } = options;

        if batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize.into());
        }

        let counted = to.is_none();
        let to = match to {
            Some(to) => to,
            None => count_source(&query)?,
        };

        if offset > to {
            return Err(ConfigError::OffsetPastEnd { offset, to }.into());
        }

        let batcher = Self {
            query,
            batch_size,
            to,
            offset,
            order_by,
        };

        debug!(
            offset,
            to,
            batch_size,
            batches = batcher.len(),
            counted,
            "batcher built"
        );
        sink::record(MetricsEvent::BatcherBuilt {
            batches: batcher.len(),
            batch_size,
            counted,
        });

        Ok(batcher)
    }

    /// Lazy sequence of sub-queries covering `[offset, to)`.
    #[must_use]
    pub fn batches(&self) -> Batches<Q> {
        Batches::new(self.ordered_base(), self.windows())
    }

    /// Consume the batcher into its sequence of sub-queries.
    #[must_use]
    pub fn into_batches(self) -> Batches<Q> {
        let windows = self.windows();
        let base = if self.query.has_explicit_ordering() {
            self.query
        } else {
            self.query.order_by(&self.order_by)
        };

        Batches::new(base, windows)
    }

    /// The `(skip, limit)` windows alone, without touching the query.
    #[must_use]
    pub const fn windows(&self) -> Partition {
        Partition::new(self.offset, self.to, self.batch_size)
    }

    // Decided once per sequence: an ordering already on the source wins.
    fn ordered_base(&self) -> Q {
        if self.query.has_explicit_ordering() {
            self.query.clone()
        } else {
            self.query.order_by(&self.order_by)
        }
    }

    #[must_use]
    pub const fn query(&self) -> &Q {
        &self.query
    }

    #[must_use]
    pub const fn batch_size(&self) -> u64 {
        self.batch_size
    }

    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    #[must_use]
    pub const fn to(&self) -> u64 {
        self.to
    }

    #[must_use]
    pub const fn order_by(&self) -> &OrderSpec {
        &self.order_by
    }

    /// Number of batches, `ceil((to - offset) / batch_size)`.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.windows().remaining()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.offset == self.to
    }
}

fn count_source<Q: Query>(query: &Q) -> Result<u64, BatchError> {
    match query.count() {
        Ok(count) => {
            sink::record(MetricsEvent::CountIssued { failed: false });
            Ok(count)
        }
        Err(err) => {
            warn!(error = %err.display_with_class(), "counting source query failed");
            sink::record(MetricsEvent::CountIssued { failed: true });
            Err(err.into())
        }
    }
}

/// Split `query` into batches in one call.
pub fn in_batches<Q: Query>(query: Q, options: BatchOptions) -> Result<Batches<Q>, BatchError> {
    Batcher::new(query, options).map(Batcher::into_batches)
}

///
/// Batches
///
/// Lazy, finite sequence of sub-queries, one per window.
/// Each sub-query is built only when pulled; dropping the sequence early
/// releases nothing but the base query.
///

#[derive(Clone, Debug)]
pub struct Batches<Q> {
    base: Q,
    windows: Partition,
}

impl<Q: Query> Batches<Q> {
    const fn new(base: Q, windows: Partition) -> Self {
        Self { base, windows }
    }

    /// Next sub-query together with the window it covers.
    pub fn next_with_window(&mut self) -> Option<(BatchWindow, Q)> {
        let window = self.windows.next()?;

        trace!(skip = window.skip, limit = window.limit, "batch planned");
        sink::record(MetricsEvent::BatchPlanned {
            skip: window.skip,
            limit: window.limit,
        });

        let query = self.base.limit(window.limit).skip(window.skip);

        Some((window, query))
    }

    /// Ordered base every sub-query is derived from.
    #[must_use]
    pub const fn base(&self) -> &Q {
        &self.base
    }
}

impl<Q: Query> Iterator for Batches<Q> {
    type Item = Q;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_with_window().map(|(_, query)| query)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.windows.size_hint()
    }
}

impl<Q: Query> ExactSizeIterator for Batches<Q> {}

impl<Q: Query> FusedIterator for Batches<Q> {}
