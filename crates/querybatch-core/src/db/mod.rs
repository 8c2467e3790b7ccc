//! Batching engine: query capability, partitioning, and batched execution.

pub mod batch;
pub mod collection;
pub mod query;
pub mod store;

// re-exports
pub use batch::{BatchOptions, BatchWindow, Batcher, Batches, DEFAULT_BATCH_SIZE, in_batches};
pub use collection::{BatchRecords, Collection, ExecutedBatches};
pub use query::{Execute, OrderDirection, OrderSpec, PRIMARY_KEY_FIELD, Query};
