//! Configuration types and loading for the table migrator.
//!
//! Provides the shared configuration structures consumed by the pipeline and
//! the binary, plus hierarchical loading from files and environment variables.

mod environment;
mod load;
mod secret;
pub mod shared;

pub use environment::Environment;
pub use load::{Config, LoadConfigError, load_config};
pub use secret::SerializableSecretString;
