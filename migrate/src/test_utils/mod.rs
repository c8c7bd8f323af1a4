//! Testing utilities for migration pipelines.
//!
//! Provides the helpers integration tests are built from: item builders
//! matching the user schema, pipeline constructors with test defaults, and a
//! store client wrapper that counts operations and injects write failures.
//! Everything here is compiled only for tests or behind the `test-utils`
//! feature.
//!
//! # Module Organization
//!
//! - [`item`] - Builders for source-shaped and target-shaped items
//! - [`pipeline`] - Pipeline and table setup with test defaults
//! - [`test_client_wrapper`] - Store client wrapper with observability and
//!   fault injection

pub mod item;
pub mod pipeline;
pub mod test_client_wrapper;
