use serde::{Deserialize, Serialize};

use crate::shared::{ValidationError, batch::BatchConfig};

/// Configuration for one migration pipeline run.
///
/// Contains all settings required to move records from the source table to
/// the target table: table names, the platform filter, batch sizing, and the
/// number of concurrent workers.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipelineConfig {
    /// The unique identifier for this pipeline, used to correlate log output.
    pub id: u64,
    /// Name of the table records are read from.
    pub source_table: String,
    /// Name of the table records are written to.
    pub target_table: String,
    /// Records are migrated only when their `platform` attribute equals this value.
    pub platform: String,
    /// Batch sizing configuration.
    #[serde(default)]
    pub batch: BatchConfig,
    /// Number of concurrent migration workers draining the work channel.
    #[serde(default = "default_worker_count")]
    pub worker_count: u16,
}

impl PipelineConfig {
    /// Default number of concurrent migration workers.
    pub const DEFAULT_WORKER_COUNT: u16 = 4;

    /// Validates pipeline configuration settings.
    ///
    /// Checks table names, the platform filter, batch sizing, and ensures the
    /// worker count is non-zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.source_table.is_empty() {
            return Err(ValidationError::EmptyField("pipeline.source_table"));
        }

        if self.target_table.is_empty() {
            return Err(ValidationError::EmptyField("pipeline.target_table"));
        }

        if self.platform.is_empty() {
            return Err(ValidationError::EmptyField("pipeline.platform"));
        }

        self.batch.validate()?;

        if self.worker_count == 0 {
            return Err(ValidationError::WorkerCountZero);
        }

        Ok(())
    }
}

fn default_worker_count() -> u16 {
    PipelineConfig::DEFAULT_WORKER_COUNT
}
