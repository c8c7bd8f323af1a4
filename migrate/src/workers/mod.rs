//! Worker implementations for migration pipeline operations.

pub mod base;
pub mod dispatch;
pub mod migration;
pub mod pool;
