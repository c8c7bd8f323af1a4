//! Common types used throughout the migration pipeline.
//!
//! Re-exports the typed record model shared by the conversion layer, the
//! migration workers, and the verification pass of the binary.

mod record;

pub use record::*;
