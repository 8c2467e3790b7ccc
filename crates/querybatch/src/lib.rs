//! ## Crate layout
//! - `core`: query capability traits, the batch partitioner, batched
//!   execution, configuration, and observability.
//! - `memory`: the in-process document store.
//!
//! The `prelude` module brings the batching vocabulary and traits into scope.

pub use querybatch_core as core;
pub use querybatch_core::db::store::memory;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Top-level surface
//

pub use crate::core::{
    BatchError, ConfigError, StoreError,
    config::BatchConfig,
    db::{BatchOptions, BatchWindow, Batcher, Batches, ExecutedBatches, in_batches},
};

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::db::{
        BatchOptions, Batcher, OrderDirection, OrderSpec, in_batches,
        collection::Collection as _,
        query::{Execute as _, Query as _},
    };
}
