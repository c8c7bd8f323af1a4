use config::shared::{BatchConfig, PipelineConfig};

use crate::conversions::record::USER_ID_FIELD;
use crate::pipeline::{Pipeline, PipelineId};
use crate::store::StoreClient;
use crate::store::memory::MemoryStoreClient;

/// Source table name used by pipeline tests.
pub const SOURCE_TABLE: &str = "UsersOriginal";
/// Target table name used by pipeline tests.
pub const TARGET_TABLE: &str = "UsersTarget";
/// Platform value pipeline tests filter on.
pub const TEST_PLATFORM: &str = "ios";

/// Builds a pipeline configuration with test defaults.
///
/// Tables and filter mirror the development environment; batch size and
/// worker count are the knobs tests usually turn.
pub fn test_pipeline_config(
    id: PipelineId,
    batch_max_size: usize,
    worker_count: u16,
) -> PipelineConfig {
    PipelineConfig {
        id,
        source_table: SOURCE_TABLE.to_owned(),
        target_table: TARGET_TABLE.to_owned(),
        platform: TEST_PLATFORM.to_owned(),
        batch: BatchConfig {
            max_size: batch_max_size,
        },
        worker_count,
    }
}

/// Creates a pipeline over `client` with the test configuration.
pub fn create_pipeline<C>(
    id: PipelineId,
    batch_max_size: usize,
    worker_count: u16,
    client: C,
) -> Pipeline<C>
where
    C: StoreClient + Clone + Send + Sync + 'static,
{
    Pipeline::new(
        id,
        test_pipeline_config(id, batch_max_size, worker_count),
        client,
    )
}

/// Registers both migration tables on an in-memory client, keyed by user id.
pub async fn create_user_tables(client: &MemoryStoreClient) {
    client.create_table(SOURCE_TABLE, USER_ID_FIELD).await;
    client.create_table(TARGET_TABLE, USER_ID_FIELD).await;
}
