//! Concurrent table-to-table migration pipeline.
//!
//! Reads every record matching a platform filter from a source table, splits
//! the result into fixed-size batches, and fans the batches out to a pool of
//! migration workers that decode and write them into a target table. The
//! first worker error cancels the run and is surfaced by the coordinator.

pub mod batch;
pub mod concurrency;
pub mod conversions;
pub mod error;
mod macros;
pub mod pipeline;
pub mod scan;
pub mod store;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;
pub mod workers;
