//! Store adapters implementing the query capability.

pub mod memory;
