//! Query capability surface consumed by the batcher.
//!
//! Store adapters implement [`Query`] (and [`Execute`] when they can run a
//! query). All operations take `&self` and return a fresh query; the
//! receiver is never mutated.

mod order;

use crate::error::StoreError;

pub use order::{OrderDirection, OrderSpec, PRIMARY_KEY_FIELD, ParseOrderDirectionError};

///
/// Query
///
/// Handle to a filtered, possibly ordered set of records in an external store.
///

pub trait Query: Clone {
    /// Number of records matched by this query, ignoring limit and skip.
    /// One store round trip.
    fn count(&self) -> Result<u64, StoreError>;

    #[must_use]
    fn order_by(&self, order: &OrderSpec) -> Self;

    #[must_use]
    fn limit(&self, limit: u64) -> Self;

    #[must_use]
    fn skip(&self, skip: u64) -> Self;

    /// True when an ordering has already been applied to this query.
    fn has_explicit_ordering(&self) -> bool;
}

///
/// Execute
///
/// Runs a query against its store and materializes the matched records.
///

pub trait Execute: Query {
    type Record;

    fn execute(&self) -> Result<Vec<Self::Record>, StoreError>;
}
