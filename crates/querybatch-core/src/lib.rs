//! Core runtime for querybatch: the query capability traits, the batch
//! partitioner, collection-level batch execution, configuration loading,
//! and observability.

// public exports are one module level down
pub mod config;
pub mod db;
pub mod error;
pub mod obs;

// test
#[cfg(test)]
pub(crate) mod test_support;

pub use error::{BatchError, ConfigError, StoreError};

///
/// Prelude
///
/// Prelude contains the batching vocabulary and capability traits.
/// Errors, stores, and observability stay behind their module paths.
///

pub mod prelude {
    pub use crate::db::{
        batch::{BatchOptions, Batcher, in_batches},
        collection::Collection,
        query::{Execute, OrderDirection, OrderSpec, Query},
    };
}
