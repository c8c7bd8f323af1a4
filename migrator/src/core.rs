use config::load_config;
use config::shared::{MigratorConfig, PipelineConfig, StoreConfig};
use dynamo::{ScanExpression, item_to_json};
use migrate::conversions::record::record_from_item;
use migrate::pipeline::Pipeline;
use migrate::scan::read_all_items;
use migrate::store::dynamo::DynamoStoreClient;
use tracing::{debug, error, info, warn};

/// Starts the migrator service.
///
/// Loads and validates the configuration, connects the store client, runs the
/// migration pipeline to completion and then verifies the target table.
pub async fn start_migrator() -> anyhow::Result<()> {
    info!("starting migrator service");

    let migrator_config = load_config::<MigratorConfig>()?;
    migrator_config.validate()?;

    log_config(&migrator_config);

    // The store client is created once and shared by cloning.
    let client = DynamoStoreClient::connect(&migrator_config.store).await;

    let pipeline = Pipeline::new(
        migrator_config.pipeline.id,
        migrator_config.pipeline.clone(),
        client.clone(),
    );

    start_pipeline(pipeline).await?;

    verify_target_table(&client, &migrator_config).await?;

    Ok(())
}

fn log_config(config: &MigratorConfig) {
    log_store_config(&config.store);
    log_pipeline_config(&config.pipeline);
}

fn log_store_config(config: &StoreConfig) {
    debug!(
        region = config.region,
        endpoint = config.endpoint,
        "using store config"
    );
}

fn log_pipeline_config(config: &PipelineConfig) {
    debug!(
        id = config.id,
        source_table = config.source_table,
        target_table = config.target_table,
        platform = config.platform,
        batch_max_size = config.batch.max_size,
        worker_count = config.worker_count,
        "using pipeline config"
    );
}

async fn start_pipeline(mut pipeline: Pipeline<DynamoStoreClient>) -> anyhow::Result<()> {
    // Start the pipeline.
    pipeline.start().await?;

    // Spawn a task to listen for Ctrl+C and trigger shutdown.
    let shutdown_tx = pipeline.shutdown_tx();
    let shutdown_handle = tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for ctrl+c: {:?}", e);
            return;
        }

        info!("ctrl+c received, shutting down pipeline");
        if let Err(e) = shutdown_tx.shutdown() {
            warn!("failed to send shutdown signal: {:?}", e);
        }
    });

    // Wait for the pipeline to finish (either normally or via shutdown).
    let result = pipeline.wait().await;

    // If the pipeline finished before Ctrl+C, the shutdown task is still
    // listening and has to be aborted.
    shutdown_handle.abort();
    let _ = shutdown_handle.await;

    result?;

    Ok(())
}

/// Reads back the full target table and logs every migrated record.
///
/// Runs only after a successful migration. A failure here exits the process
/// non-zero while the already migrated data stays in place.
async fn verify_target_table(
    client: &DynamoStoreClient,
    config: &MigratorConfig,
) -> anyhow::Result<()> {
    info!(
        "verifying migrated records in table '{}'",
        config.pipeline.target_table
    );

    let items = read_all_items(
        client,
        &config.pipeline.target_table,
        &ScanExpression::default(),
    )
    .await?;

    for item in &items {
        let record = record_from_item(item)?;

        info!(id = record.id, name = record.name, "verified migrated record");
        debug!(item = %item_to_json(item), "raw target item");
    }

    info!("verified {} migrated records in total", items.len());

    Ok(())
}
