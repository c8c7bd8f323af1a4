use serde::{Deserialize, Serialize};

use crate::Config;
use crate::shared::{PipelineConfig, StoreConfig, ValidationError};

/// Complete configuration for the migrator binary.
///
/// Aggregates the store connection settings and the pipeline settings.
/// Typically loaded from configuration files at startup via [`crate::load_config`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigratorConfig {
    /// Connection settings for the document store.
    pub store: StoreConfig,
    /// Settings for the migration pipeline itself.
    pub pipeline: PipelineConfig,
}

impl MigratorConfig {
    /// Validates the complete migrator configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.store.validate()?;
        self.pipeline.validate()
    }
}

impl Config for MigratorConfig {
    const LIST_PARSE_KEYS: &'static [&'static str] = &[];
}
