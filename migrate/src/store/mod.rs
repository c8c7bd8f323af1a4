//! Document store abstractions for the migration pipeline.
//!
//! This module provides the core [`StoreClient`] trait together with the
//! network-backed implementation used in production and an in-memory
//! implementation used by tests. The pipeline reads through paginated scans
//! and writes through single-item puts; the trait exposes exactly those two
//! operations.

mod base;
pub mod dynamo;
pub mod memory;

pub use base::StoreClient;
