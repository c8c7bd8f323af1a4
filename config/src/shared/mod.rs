//! Shared configuration types for the migration pipeline.

mod base;
mod batch;
mod migrator;
mod pipeline;
mod store;

pub use base::ValidationError;
pub use batch::BatchConfig;
pub use migrator::MigratorConfig;
pub use pipeline::PipelineConfig;
pub use store::StoreConfig;
