//! Concurrency utilities for coordinating pipeline operations.
//!
//! Provides the primitives the pipeline uses to coordinate its workers:
//!
//! - The dispatch worker publishes batches to the migration workers
//! - Migration workers compete for batches from a shared channel
//! - The pipeline coordinator joins every worker and aggregates failures
//!
//! # Graceful Shutdown
//!
//! The [`shutdown`] module implements a broadcast-based shutdown pattern where a
//! single signal terminates every worker. Workers finish the batch they are
//! currently processing before terminating, so shutdown never interrupts a
//! half-written batch. The signal is idempotent: triggering it again after the
//! first time has no further effect.

pub mod shutdown;
