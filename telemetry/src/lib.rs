//! Telemetry initialization for the migrator binaries and tests.

pub mod tracing;
